use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::session::SessionStore;

/// Top navigation for protected views: section links plus the signed-in
/// user's name and avatar from the session store.
#[component]
pub fn Navbar() -> impl IntoView {
    let session = expect_context::<SessionStore>();
    let navigate = use_navigate();

    let full_name = session.full_name();
    let avatar_url = session.avatar_url();

    let logout_session = session.clone();
    let logout = move |_| {
        logout_session.clear();
        navigate("/login", Default::default());
    };

    view! {
        <nav class="navbar">
            <div class="navbar-links">
                <a href="/dashboard" class="nav-link">"Dashboard"</a>
                <a href="/experiment" class="nav-link">"Experiments"</a>
                <a href="/configuration" class="nav-link">"Configurations"</a>
                <a href="/function" class="nav-link">"Functions"</a>
            </div>
            <div class="navbar-user">
                <span class="user-name">{full_name}</span>
                <img src=avatar_url alt="avatar" class="avatar" />
                <button class="btn btn-logout" on:click=logout>"Log out"</button>
            </div>
        </nav>
    }
}
