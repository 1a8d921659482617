use crate::types::Draft;
use gloo_console::error;
use wasm_bindgen::JsValue;
use web_sys::{Event, File, FormData, HtmlInputElement, HtmlTextAreaElement, InputEvent};
use yew::{function_component, html, html::TargetCast, use_state, Callback, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct ComposeProps {
    pub draft: Draft,
    pub sending: bool,
    pub close: Callback<()>,
    pub send: Callback<FormData>,
}

/// sending requires a recipient and a subject
pub fn can_send(to: &str, subject: &str) -> bool {
    !to.trim().is_empty() && !subject.trim().is_empty()
}

fn build_form(to: &str, subject: &str, body: &str, files: &[File]) -> Result<FormData, JsValue> {
    let form = FormData::new()?;
    form.append_with_str("to", to)?;
    form.append_with_str("subject", subject)?;
    form.append_with_str("body", body)?;

    for file in files {
        form.append_with_blob_and_filename("attachments", file, &file.name())?;
    }

    Ok(form)
}

#[function_component(ComposeModal)]
pub fn compose(props: &ComposeProps) -> Html {
    let to = use_state(|| props.draft.to.clone());
    let subject = use_state(|| props.draft.subject.clone());
    let body = use_state(|| props.draft.body.clone());
    let files = use_state(Vec::<File>::new);

    let on_to = {
        let to = to.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            to.set(input.value());
        })
    };
    let on_subject = {
        let subject = subject.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            subject.set(input.value());
        })
    };
    let on_body = {
        let body = body.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            body.set(input.value());
        })
    };
    let on_files = {
        let files = files.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut selected = (*files).clone();

            if let Some(list) = input.files() {
                selected.extend((0..list.length()).filter_map(|i| list.get(i)));
            }

            // allow picking the same file again
            input.set_value("");
            files.set(selected);
        })
    };

    let on_close = {
        let close = props.close.clone();
        Callback::from(move |_| close.emit(()))
    };

    let sendable = can_send(&to, &subject) && !props.sending;
    let on_send = {
        let send = props.send.clone();
        let (to, subject, body, files) = (to.clone(), subject.clone(), body.clone(), files.clone());
        Callback::from(move |_| {
            if !can_send(&to, &subject) {
                return;
            }

            match build_form(&to, &subject, &body, &files) {
                Ok(form) => send.emit(form),
                Err(e) => error!("Error building the message form", e),
            }
        })
    };

    let attachments = files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            let onremove = {
                let files = files.clone();
                Callback::from(move |_| {
                    let mut remaining = (*files).clone();
                    remaining.remove(index);
                    files.set(remaining);
                })
            };

            html! {
              <li>
                <span class="name">{file.name()}</span>
                <button class="remove" title="Remove attachment" onclick={onremove} />
              </li>
            }
        })
        .collect::<Html>();

    html! {
      <div class="modal">
        <div class="compose">
          <header>
            <h2>{"New message"}</h2>
            <button class="close" title="Close" onclick={on_close.clone()} />
          </header>
          <label>
            {"To"}
            <input
              type="email"
              value={(*to).clone()}
              placeholder="recipient@example.com"
              oninput={on_to}
            />
          </label>
          <label>
            {"Subject"}
            <input
              type="text"
              value={(*subject).clone()}
              placeholder="Email subject"
              oninput={on_subject}
            />
          </label>
          <label class="attach">
            {"Attach files"}
            <input type="file" multiple={true} onchange={on_files} />
          </label>
          if !files.is_empty() {
            <ul class="attachments">{attachments}</ul>
          }
          <textarea
            value={(*body).clone()}
            placeholder="Write your email here..."
            oninput={on_body}
          />
          <footer>
            <span class="characters">{format!("{} characters", body.chars().count())}</span>
            <button onclick={on_close}>{"Cancel"}</button>
            <button class="send" disabled={!sendable} onclick={on_send}>
              if props.sending {
                {"Sending…"}
              } else {
                {"Send"}
              }
            </button>
          </footer>
        </div>
      </div>
    }
}

#[cfg(test)]
mod tests {
    use super::can_send;

    #[test]
    fn recipient_and_subject_are_required() {
        assert!(can_send("client@business.com", "Hello"));
        assert!(!can_send("", "Hello"));
        assert!(!can_send("client@business.com", "  "));
    }
}
