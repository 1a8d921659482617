use gloo_console::{error, log};
use wasm_bindgen_futures::spawn_local;
use web_sys::FormData;
use yew::prelude::*;

use crate::{
    api::{
        delete_email, fetch_emails, fetch_folders, move_email, send_email, set_read, set_starred,
        PAGE_SIZE,
    },
    compose::ComposeModal,
    list::EmailList,
    search_bar::SearchBar,
    sidebar::Sidebar,
    types::{Draft, Email, EmailPage, Folder},
    view::ViewEmail,
};

const DEFAULT_FOLDER: &str = "inbox";

/// a refresh reloads every email shown so far, at least one page
fn refresh_limit(loaded: usize) -> usize {
    loaded.max(PAGE_SIZE)
}

pub enum Msg {
    // cache contents
    Folders(Vec<Folder>),
    Page(u64, EmailPage),
    More(u64, EmailPage),
    // cache invalidation
    InvalidatePage,
    Invalidate,
    // navigation
    SelectFolder(String),
    Search(String),
    LoadMore,
    Select(Email),
    ToggleSidebar,
    // mutations
    Updated(Email),
    Star(String, bool),
    MarkUnread(String),
    Move(String, String),
    Delete(String),
    Removed(String),
    Compose(Draft),
    CloseCompose,
    Send(FormData),
    Sent,
    Failed(String),
}

pub struct Overview {
    folders: Vec<Folder>,
    page: EmailPage,
    // incremented on every page request, stale responses are dropped
    generation: u64,
    folder: String,
    search: String,
    selected: Option<Email>,
    compose: Option<Draft>,
    sending: bool,
    sidebar_open: bool,
    loading: bool,
    error: Option<String>,
}

impl Overview {
    fn refresh_folders(&self, ctx: &Context<Self>) {
        let link = ctx.link().clone();
        spawn_local(async move {
            match fetch_folders().await {
                Ok(folders) => link.send_message(Msg::Folders(folders)),
                Err(e) => link.send_message(Msg::Failed(e.to_string())),
            }
        });
    }

    fn refresh_page(&mut self, ctx: &Context<Self>) {
        self.generation += 1;
        self.loading = true;

        let generation = self.generation;
        let limit = refresh_limit(self.page.emails.len());
        let folder = self.folder.clone();
        let search = self.search.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            match fetch_emails(&folder, &search, 0, limit).await {
                Ok(page) => link.send_message(Msg::Page(generation, page)),
                Err(e) => link.send_message(Msg::Failed(e.to_string())),
            }
        });
    }

    /// run a mutation, the caches are invalidated once it completed
    fn mutate<F>(ctx: &Context<Self>, request: F)
    where
        F: std::future::Future<Output = Result<Msg, gloo_net::Error>> + 'static,
    {
        let link = ctx.link().clone();
        spawn_local(async move {
            match request.await {
                Ok(msg) => {
                    link.send_message(msg);
                    link.send_message(Msg::Invalidate);
                }
                Err(e) => link.send_message(Msg::Failed(e.to_string())),
            }
        });
    }

    fn deselect(&mut self, id: &str) {
        if self.selected.as_ref().is_some_and(|s| s.id == id) {
            self.selected = None;
        }
    }
}

impl Component for Overview {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Invalidate);

        Self {
            folders: vec![],
            page: EmailPage::default(),
            generation: 0,
            folder: DEFAULT_FOLDER.to_owned(),
            search: String::new(),
            selected: None,
            compose: None,
            sending: false,
            sidebar_open: false,
            loading: true,
            error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Folders(folders) => {
                self.folders = folders;
            }
            Msg::Page(generation, page) => {
                if generation != self.generation {
                    return false;
                }

                // keep the open message in sync with the fresh page
                if let Some(selected) = &self.selected {
                    if let Some(fresh) = page.emails.iter().find(|e| e.id == selected.id) {
                        self.selected = Some(fresh.clone());
                    }
                }

                self.page = page;
                self.loading = false;
                self.error = None;
            }
            Msg::More(generation, page) => {
                if generation != self.generation {
                    return false;
                }

                self.page.emails.extend(page.emails);
                self.page.total = page.total;
                self.page.has_more = page.has_more;
            }
            Msg::InvalidatePage => self.refresh_page(ctx),
            Msg::Invalidate => {
                self.refresh_folders(ctx);
                self.refresh_page(ctx);
            }
            Msg::SelectFolder(folder) => {
                self.folder = folder;
                self.page = EmailPage::default();
                self.sidebar_open = false;
                ctx.link().send_message(Msg::InvalidatePage);
            }
            Msg::Search(search) => {
                self.search = search;
                self.page = EmailPage::default();
                ctx.link().send_message(Msg::InvalidatePage);
            }
            Msg::LoadMore => {
                let generation = self.generation;
                let offset = self.page.emails.len();
                let folder = self.folder.clone();
                let search = self.search.clone();
                let link = ctx.link().clone();
                spawn_local(async move {
                    match fetch_emails(&folder, &search, offset, PAGE_SIZE).await {
                        Ok(page) => link.send_message(Msg::More(generation, page)),
                        Err(e) => link.send_message(Msg::Failed(e.to_string())),
                    }
                });

                return false;
            }
            Msg::Select(email) => {
                if !email.read {
                    let id = email.id.clone();
                    Self::mutate(ctx, async move { set_read(&id, true).await.map(Msg::Updated) });
                }

                self.selected = Some(email);
            }
            Msg::ToggleSidebar => {
                self.sidebar_open = !self.sidebar_open;
            }
            Msg::Updated(email) => {
                if self.selected.as_ref().is_some_and(|s| s.id == email.id) {
                    self.selected = Some(email);
                }
            }
            Msg::Star(id, starred) => {
                Self::mutate(ctx, async move {
                    set_starred(&id, starred).await.map(Msg::Updated)
                });
            }
            Msg::MarkUnread(id) => {
                Self::mutate(ctx, async move { set_read(&id, false).await.map(Msg::Updated) });
            }
            Msg::Move(id, folder) => {
                Self::mutate(ctx, async move {
                    move_email(&id, &folder).await.map(|email| Msg::Removed(email.id))
                });
            }
            Msg::Delete(id) => {
                Self::mutate(ctx, async move {
                    let response = delete_email(&id).await?;
                    log!(if response.permanent {
                        "email deleted"
                    } else {
                        "email moved to trash"
                    });

                    Ok::<_, gloo_net::Error>(Msg::Removed(id))
                });
            }
            Msg::Removed(id) => self.deselect(&id),
            Msg::Compose(draft) => {
                self.compose = Some(draft);
            }
            Msg::CloseCompose => {
                self.compose = None;
            }
            Msg::Send(form) => {
                self.sending = true;
                Self::mutate(ctx, async move {
                    let response = send_email(form).await?;
                    log!("email sent", response.email.id);

                    Ok::<_, gloo_net::Error>(Msg::Sent)
                });
            }
            Msg::Sent => {
                self.sending = false;
                self.compose = None;
            }
            Msg::Failed(message) => {
                error!("Request failed", &message);
                self.sending = false;
                self.loading = false;
                self.error = Some(message);
            }
        };

        true
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let unread = self.page.emails.iter().filter(|e| !e.read).count();
        let title = if unread > 0 {
            format!("Webmail ({unread})")
        } else {
            "Webmail".to_owned()
        };

        gloo_utils::document().set_title(&title);
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let selected_id = self.selected.as_ref().map(|e| e.id.clone());

        html! {
          <>
            <header>
              <button class="menu" title="Toggle folders" onclick={link.callback(|_| Msg::ToggleSidebar)} />
              <h1>{"Web"}<span>{"mail"}</span></h1>
              <div>
                <button class="compose" onclick={link.callback(|_| Msg::Compose(Draft::default()))}>
                  {"Compose"}
                </button>
              </div>
            </header>
            if let Some(error) = &self.error {
              <div class="error">{error}</div>
            }
            <div class="main">
              <Sidebar
                folders={self.folders.clone()}
                selected={self.folder.clone()}
                open={self.sidebar_open}
                select={link.callback(Msg::SelectFolder)}
                close={link.callback(|_| Msg::ToggleSidebar)}
              />
              <div class="list">
                <SearchBar
                  value={self.search.clone()}
                  placeholder="Search emails..."
                  search={link.callback(Msg::Search)}
                />
                <ul>
                  <EmailList
                    emails={self.page.emails.clone()}
                    selected={selected_id}
                    loading={self.loading}
                    folder={self.folder.clone()}
                    select={link.callback(Msg::Select)}
                    star={link.callback(|(id, starred)| Msg::Star(id, starred))}
                    delete={link.callback(Msg::Delete)}
                  />
                </ul>
                if self.page.has_more {
                  <div class="more">
                    <span>{format!("Showing {} of {}", self.page.emails.len(), self.page.total)}</span>
                    <button onclick={link.callback(|_| Msg::LoadMore)}>{"Load more"}</button>
                  </div>
                }
              </div>
              <div class="view">
                if let Some(email) = &self.selected {
                  <ViewEmail
                    email={email.clone()}
                    folders={self.folders.clone()}
                    star={{
                        let id = email.id.clone();
                        link.callback(move |starred| Msg::Star(id.clone(), starred))
                    }}
                    mark_unread={{
                        let id = email.id.clone();
                        link.callback(move |_| Msg::MarkUnread(id.clone()))
                    }}
                    move_to={{
                        let id = email.id.clone();
                        link.callback(move |folder| Msg::Move(id.clone(), folder))
                    }}
                    delete={{
                        let id = email.id.clone();
                        link.callback(move |_| Msg::Delete(id.clone()))
                    }}
                    reply={{
                        let draft = Draft::reply_to(email);
                        link.callback(move |_| Msg::Compose(draft.clone()))
                    }}
                  />
                } else {
                  <div class="empty">
                    <h3>{"No email selected"}</h3>
                    <p>{"Select an email from the list to view its content"}</p>
                  </div>
                }
              </div>
            </div>
            if let Some(draft) = &self.compose {
              <ComposeModal
                draft={draft.clone()}
                sending={self.sending}
                close={link.callback(|_| Msg::CloseCompose)}
                send={link.callback(Msg::Send)}
              />
            }
          </>
        }
    }
}
