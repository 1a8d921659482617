use crate::{
    api::get_upload_path,
    date::format_date,
    types::{Email, Folder},
};
use chrono::Local;
use web_sys::{Event, HtmlSelectElement};
use yew::{function_component, html, html::TargetCast, Callback, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct ViewEmailProps {
    pub email: Email,
    pub folders: Vec<Folder>,
    pub star: Callback<bool>,
    pub mark_unread: Callback<()>,
    pub move_to: Callback<String>,
    pub delete: Callback<()>,
    pub reply: Callback<()>,
}

/// strip the `<unix millis>-` prefix the server adds to stored attachments
fn display_name(stored: &str) -> &str {
    match stored.split_once('-') {
        Some((millis, name))
            if !millis.is_empty() && !name.is_empty() && millis.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => stored,
    }
}

#[function_component(ViewEmail)]
pub fn view(props: &ViewEmailProps) -> Html {
    let email = &props.email;
    let date = email.timestamp.with_timezone(&Local);

    let onstar = {
        let star = props.star.clone();
        let starred = email.starred;
        Callback::from(move |_| star.emit(!starred))
    };
    let onunread = {
        let mark_unread = props.mark_unread.clone();
        Callback::from(move |_| mark_unread.emit(()))
    };
    let ondelete = {
        let delete = props.delete.clone();
        Callback::from(move |_| delete.emit(()))
    };
    let onreply = {
        let reply = props.reply.clone();
        Callback::from(move |_| reply.emit(()))
    };
    let onmove = {
        let move_to = props.move_to.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let folder = select.value();

            if !folder.is_empty() {
                move_to.emit(folder);
            }
        })
    };

    html! {
      <div class="view-inner">
        <div class="actions">
          <button
            class={if email.starred { "star starred" } else { "star" }}
            title={if email.starred { "Unstar" } else { "Star" }}
            onclick={onstar}
          />
          <button onclick={onreply}>{"Reply"}</button>
          if email.read {
            <button onclick={onunread}>{"Mark unread"}</button>
          }
          <select onchange={onmove} title="Move to folder">
            <option value="" selected={true}>{"Move to…"}</option>
            {props.folders.iter().filter(|f| f.id != email.folder).map(|f| html! {
              <option value={f.id.clone()}>{&f.name}</option>
            }).collect::<Html>()}
          </select>
          <button class="delete" onclick={ondelete}>
            if email.folder == "trash" {
              {"Delete forever"}
            } else {
              {"Delete"}
            }
          </button>
        </div>
        <table>
          <tbody>
            <tr>
              <th>{"From"}</th>
              <td>{&email.from}</td>
            </tr>
            <tr>
              <th>{"To"}</th>
              <td>{&email.to}</td>
            </tr>
            <tr>
              <th>{"Subject"}</th>
              <td>{&email.subject}</td>
            </tr>
            <tr>
              <th>{"Date"}</th>
              <td title={date.to_rfc2822()}>{format_date(&date, &Local::now(), true)}</td>
            </tr>
          </tbody>
        </table>
        if !email.attachments.is_empty() {
          <div class="attachments">
            <h3>{format!("Attachments ({})", email.attachments.len())}</h3>
            {email.attachments.iter().map(|a| html! {
              <a href={get_upload_path(a)} download={display_name(a).to_owned()} target="_blank">
                {display_name(a)}
              </a>
            }).collect::<Html>()}
          </div>
        }
        <div class="body">
          <pre>{&email.body}</pre>
        </div>
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::display_name;
    use crate::api::upload_path;

    #[test]
    fn timestamp_prefix_is_hidden() {
        assert_eq!(display_name("1737364200000-report.pdf"), "report.pdf");
        assert_eq!(display_name("1737364200000-q4-report.pdf"), "q4-report.pdf");
        assert_eq!(display_name("campaign-proposal.pdf"), "campaign-proposal.pdf");
        assert_eq!(display_name("notes.txt"), "notes.txt");
    }

    #[test]
    fn attachment_links_are_encoded() {
        assert_eq!(
            upload_path("", "1737364200000-report.pdf"),
            "/uploads/1737364200000-report.pdf"
        );
        assert_eq!(
            upload_path("/mail", "1737364200000-q4#1?.pdf"),
            "/mail/uploads/1737364200000-q4%231%3F.pdf"
        );
        assert_eq!(upload_path("", "1-50% off.txt"), "/uploads/1-50%25%20off.txt");
    }
}
