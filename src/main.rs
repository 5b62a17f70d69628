mod api;
mod app;
mod components;
mod config;
mod form;
mod pages;
mod session;

use app::App;

fn main() {
    leptos::mount::mount_to_body(App);
}
