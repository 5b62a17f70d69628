use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::spawn_local;

use crate::api::{auth, ApiClient};
use crate::session::SessionStore;

#[component]
pub fn LoginPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let session = expect_context::<SessionStore>();
    let navigate = use_navigate();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error_message, set_error_message) = signal::<Option<String>>(None);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let api = api.clone();
        let session = session.clone();
        let navigate = navigate.clone();
        let username = username.get();
        let password = password.get();

        spawn_local(async move {
            match auth::login(&api, &username, &password).await {
                Ok(tokens) => {
                    session.save(
                        &tokens.access,
                        &tokens.refresh,
                        &tokens.first_name,
                        &tokens.last_name,
                        &tokens.avatar_url,
                    );
                    navigate("/dashboard", Default::default());
                }
                Err(e) => {
                    set_error_message.set(Some(e.detail_or("Invalid login credentials")));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-card" on:submit=submit>
                <h2>"Sign in"</h2>
                {move || error_message.get().map(|e| view! { <p class="form-error">{e}</p> })}
                <input
                    type="text"
                    class="input"
                    placeholder="Username"
                    prop:value=move || username.get()
                    on:input=move |ev| set_username.set(event_target_value(&ev))
                />
                <input
                    type="password"
                    class="input"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| set_password.set(event_target_value(&ev))
                />
                <button type="submit" class="btn btn-primary">"Sign in"</button>
                <p class="auth-switch">
                    "No account yet? "
                    <a href="/register">"Register"</a>
                </p>
            </form>
        </div>
    }
}
