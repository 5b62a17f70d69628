use std::time::Duration;

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::spawn_local;

use crate::api::{auth, ApiClient};
use crate::session::SessionStore;

/// Which password rules the current input satisfies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PasswordChecks {
    length: bool,
    uppercase: bool,
    lowercase: bool,
    digit: bool,
    special: bool,
}

impl PasswordChecks {
    fn all(self) -> bool {
        self.length && self.uppercase && self.lowercase && self.digit && self.special
    }
}

fn check_password(password: &str) -> PasswordChecks {
    PasswordChecks {
        length: password.chars().count() >= 8,
        uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        digit: password.chars().any(|c| c.is_ascii_digit()),
        special: password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)),
    }
}

/// First non-satisfied requirement of the second registration step, if any.
fn first_violation(
    email_code: &str,
    first_name: &str,
    last_name: &str,
    username: &str,
    password: &str,
    confirm: &str,
) -> Option<&'static str> {
    if email_code.trim().is_empty() {
        return Some("Enter the confirmation code");
    }
    if first_name.trim().is_empty() {
        return Some("Enter your first name");
    }
    if last_name.trim().is_empty() {
        return Some("Enter your last name");
    }
    if username.trim().is_empty() {
        return Some("Enter a username");
    }
    if password.is_empty() {
        return Some("Enter a password");
    }
    if !check_password(password).all() {
        return Some("Password does not meet the requirements");
    }
    if password != confirm {
        return Some("Passwords do not match");
    }
    None
}

fn rule_class(ok: bool) -> &'static str {
    if ok {
        "rule rule-met"
    } else {
        "rule rule-unmet"
    }
}

/// Counts the resend cooldown down one second at a time.
fn run_cooldown(cooldown: ReadSignal<u64>, set_cooldown: WriteSignal<u64>) {
    set_timeout(
        move || {
            let remaining = cooldown.get_untracked();
            if remaining > 0 {
                set_cooldown.set(remaining - 1);
                if remaining > 1 {
                    run_cooldown(cooldown, set_cooldown);
                }
            }
        },
        Duration::from_secs(1),
    );
}

/// Two-step registration: request an email confirmation code, then submit
/// the code together with the account details.
#[component]
pub fn RegisterPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let session = expect_context::<SessionStore>();
    let navigate = use_navigate();

    let (step, set_step) = signal(1u8);
    let (email, set_email) = signal(String::new());
    let (email_code, set_email_code) = signal(String::new());
    let (first_name, set_first_name) = signal(String::new());
    let (last_name, set_last_name) = signal(String::new());
    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (confirm, set_confirm) = signal(String::new());
    let (error_message, set_error_message) = signal::<Option<String>>(None);
    let (cooldown, set_cooldown) = signal(0u64);

    let checks = Memo::new(move |_| check_password(&password.get()));

    let send_api = api.clone();
    let send_code = Callback::new(move |_: ()| {
        let api = send_api.clone();
        let email = email.get();
        set_error_message.set(None);

        spawn_local(async move {
            match auth::send_code(&api, &email).await {
                Ok(resp) => {
                    if let Some(wait) = resp.wait_time {
                        set_cooldown.set(wait);
                        run_cooldown(cooldown, set_cooldown);
                    } else {
                        set_step.set(2);
                    }
                }
                Err(e) => {
                    set_error_message
                        .set(Some(e.detail_or("Could not send the code. Try again.")));
                }
            }
        });
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if step.get() != 2 {
            return;
        }
        if let Some(problem) = first_violation(
            &email_code.get(),
            &first_name.get(),
            &last_name.get(),
            &username.get(),
            &password.get(),
            &confirm.get(),
        ) {
            set_error_message.set(Some(problem.to_string()));
            return;
        }

        let api = api.clone();
        let session = session.clone();
        let navigate = navigate.clone();
        let request = auth::RegisterRequest {
            email: email.get(),
            email_code: email_code.get(),
            first_name: first_name.get(),
            last_name: last_name.get(),
            username: username.get(),
            password: password.get(),
            confirm_password: confirm.get(),
        };

        spawn_local(async move {
            match auth::register(&api, &request).await {
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
                    set_error_message
                        .set(Some(e.detail_or("Registration failed. Try again.")));
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-card" on:submit=submit>
                <h2>"Register"</h2>
                {move || error_message.get().map(|e| view! { <p class="form-error">{e}</p> })}

                <Show
                    when=move || step.get() == 1
                    fallback=move || view! {
                        <div class="register-details">
                            <input
                                type="text"
                                class="input"
                                placeholder="Confirmation code"
                                prop:value=move || email_code.get()
                                on:input=move |ev| set_email_code.set(event_target_value(&ev))
                            />
                            <input
                                type="text"
                                class="input"
                                placeholder="First name"
                                prop:value=move || first_name.get()
                                on:input=move |ev| set_first_name.set(event_target_value(&ev))
                            />
                            <input
                                type="text"
                                class="input"
                                placeholder="Last name"
                                prop:value=move || last_name.get()
                                on:input=move |ev| set_last_name.set(event_target_value(&ev))
                            />
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
                            <div class="password-rules">
                                <p class=move || rule_class(checks.get().length)>"At least 8 characters"</p>
                                <p class=move || rule_class(checks.get().uppercase)>"An uppercase letter"</p>
                                <p class=move || rule_class(checks.get().lowercase)>"A lowercase letter"</p>
                                <p class=move || rule_class(checks.get().digit)>"A digit"</p>
                                <p class=move || rule_class(checks.get().special)>"A special character (!@#$%^&*)"</p>
                            </div>
                            <input
                                type="password"
                                class="input"
                                placeholder="Confirm password"
                                prop:value=move || confirm.get()
                                on:input=move |ev| set_confirm.set(event_target_value(&ev))
                            />
                            <button type="submit" class="btn btn-primary">"Create account"</button>
                        </div>
                    }
                >
                    <input
                        type="email"
                        class="input"
                        placeholder="Email address"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                    <Show
                        when=move || cooldown.get() == 0
                        fallback=move || view! {
                            <p class="cooldown-hint">
                                {move || format!("You can request another code in {} s", cooldown.get())}
                            </p>
                        }
                    >
                        <button type="button" class="btn btn-primary" on:click=move |_| send_code.run(())>
                            "Send code"
                        </button>
                    </Show>
                </Show>

                <p class="auth-switch">
                    "Already have an account? "
                    <a href="/login">"Sign in"</a>
                </p>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules_are_checked_individually() {
        let weak = check_password("abc");
        assert!(!weak.length);
        assert!(!weak.uppercase);
        assert!(weak.lowercase);
        assert!(!weak.all());

        let strong = check_password("Sup3r!pass");
        assert!(strong.all());
    }

    #[test]
    fn violations_are_reported_in_field_order() {
        assert_eq!(
            first_violation("", "Ada", "Lovelace", "ada", "Sup3r!pass", "Sup3r!pass"),
            Some("Enter the confirmation code")
        );
        assert_eq!(
            first_violation("1234", "Ada", "Lovelace", "ada", "weak", "weak"),
            Some("Password does not meet the requirements")
        );
        assert_eq!(
            first_violation("1234", "Ada", "Lovelace", "ada", "Sup3r!pass", "other"),
            Some("Passwords do not match")
        );
        assert_eq!(
            first_violation("1234", "Ada", "Lovelace", "ada", "Sup3r!pass", "Sup3r!pass"),
            None
        );
    }
}
