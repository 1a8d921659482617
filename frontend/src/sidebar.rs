use crate::types::Folder;
use web_sys::MouseEvent;
use yew::{function_component, html, Callback, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct SidebarProps {
    pub folders: Vec<Folder>,
    pub selected: String,
    pub open: bool,
    pub select: Callback<String>,
    pub close: Callback<MouseEvent>,
}

#[function_component(Sidebar)]
pub fn sidebar(props: &SidebarProps) -> Html {
    let folders = props
        .folders
        .iter()
        .map(|folder| {
            let onclick = {
                let select = props.select.clone();
                let id = folder.id.clone();
                Callback::from(move |_| select.emit(id.clone()))
            };

            let class = if folder.id == props.selected {
                "selected"
            } else {
                ""
            };

            html! {
              <li>
                <button class={class} onclick={onclick}>
                  <span class={format!("icon icon-{}", folder.icon)} />
                  <span class="name">{&folder.name}</span>
                  if folder.count > 0 {
                    <span class="count">{folder.count}</span>
                  }
                </button>
              </li>
            }
        })
        .collect::<Html>();

    html! {
      <>
        if props.open {
          <div class="overlay" onclick={props.close.clone()} />
        }
        <nav class={if props.open { "sidebar open" } else { "sidebar" }}>
          <ul>{folders}</ul>
        </nav>
      </>
    }
}
