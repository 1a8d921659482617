use web_sys::{HtmlInputElement, InputEvent};
use yew::{function_component, html, html::TargetCast, Callback, Html, Properties};

#[derive(Properties, PartialEq)]
pub struct SearchBarProps {
    pub value: String,
    pub placeholder: String,
    pub search: Callback<String>,
}

#[function_component(SearchBar)]
pub fn search_bar(props: &SearchBarProps) -> Html {
    let oninput = {
        let search = props.search.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            search.emit(input.value());
        })
    };

    let onclear = {
        let search = props.search.clone();
        Callback::from(move |_| search.emit(String::new()))
    };

    html! {
      <div class="search">
        <input
          type="search"
          value={props.value.clone()}
          placeholder={props.placeholder.clone()}
          oninput={oninput}
        />
        if !props.value.is_empty() {
          <button class="clear" title="Clear search" onclick={onclear} />
        }
      </div>
    }
}
