use crate::{date::format_date, types::Email};
use chrono::Local;
use web_sys::MouseEvent;
use yew::{function_component, html, Callback, Html, Properties};

const PREVIEW_LENGTH: usize = 100;

#[derive(Properties, PartialEq)]
pub struct EmailListProps {
    pub emails: Vec<Email>,
    pub selected: Option<String>,
    pub loading: bool,
    pub folder: String,
    pub select: Callback<Email>,
    pub star: Callback<(String, bool)>,
    pub delete: Callback<String>,
}

fn preview(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<&str>>().join(" ");

    match flat.char_indices().nth(PREVIEW_LENGTH) {
        Some((end, _)) => format!("{}…", &flat[..end]),
        None => flat,
    }
}

#[function_component(EmailList)]
pub fn list(props: &EmailListProps) -> Html {
    if props.loading && props.emails.is_empty() {
        return html! {
          <div class="bouncing-loader">
            <div></div>
            <div></div>
            <div></div>
          </div>
        };
    }

    if props.emails.is_empty() {
        return html! {
          <div class="empty">{format!("No emails in {}", props.folder)}</div>
        };
    }

    let now = Local::now();

    props
        .emails
        .iter()
        .map(|email| {
            let onclick = {
                let select = props.select.clone();
                let email = email.clone();
                Callback::from(move |_| select.emit(email.clone()))
            };

            let onstar = {
                let star = props.star.clone();
                let id = email.id.clone();
                let starred = email.starred;
                Callback::from(move |e: MouseEvent| {
                    e.stop_propagation();
                    star.emit((id.clone(), !starred));
                })
            };

            let ondelete = {
                let delete = props.delete.clone();
                let id = email.id.clone();
                Callback::from(move |e: MouseEvent| {
                    e.stop_propagation();
                    delete.emit(id.clone());
                })
            };

            let mut class = vec![];
            if props.selected.as_deref() == Some(email.id.as_str()) {
                class.push("selected");
            }
            if !email.read {
                class.push("unread");
            }

            let date = email.timestamp.with_timezone(&Local);

            html! {
              <li
                tabIndex="0"
                onclick={onclick}
                class={class.join(" ")}
              >
                <span class="head">
                  <span class="from">{&email.from}</span>
                  <span class="date" title={date.format("%Y-%m-%d %H:%M:%S").to_string()}>
                    {format_date(&date, &now, false)}
                  </span>
                </span>
                <span class="subject">
                  if !email.attachments.is_empty() {
                    <span class="attachment" title="Has attachments">{"📎"}</span>
                  }
                  {&email.subject}
                </span>
                <span class="preview">{preview(&email.body)}</span>
                <span class="row-actions">
                  <button
                    class={if email.starred { "star starred" } else { "star" }}
                    title={if email.starred { "Unstar" } else { "Star" }}
                    onclick={onstar}
                  />
                  <button class="delete" title="Delete" onclick={ondelete} />
                </span>
              </li>
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_flattens_whitespace() {
        assert_eq!(preview("Hi team,\n\nQ4   results"), "Hi team, Q4 results");
    }

    #[test]
    fn preview_is_truncated() {
        let body = "é".repeat(150);
        let result = preview(&body);

        assert_eq!(result.chars().count(), 101);
        assert!(result.ends_with('…'));
    }
}
