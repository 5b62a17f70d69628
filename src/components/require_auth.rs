use leptos::prelude::*;
use leptos_router::components::Redirect;

use crate::session::SessionStore;

/// Gate for protected views: renders its children when a session token is
/// present, otherwise redirects to the login view. The check is purely
/// local and synchronous; an expired-but-present token is caught lazily by
/// the first authenticated request.
#[component]
pub fn RequireAuth(children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<SessionStore>();

    view! {
        <Show
            when=move || session.is_authenticated()
            fallback=|| view! { <Redirect path="/login" /> }
        >
            {children()}
        </Show>
    }
}
