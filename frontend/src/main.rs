use overview::Overview;

mod api;
mod compose;
mod date;
mod list;
mod overview;
mod search_bar;
mod sidebar;
mod types;
mod view;

fn main() {
    yew::Renderer::<Overview>::new().render();
}
