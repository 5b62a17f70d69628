use leptos::prelude::*;

use crate::api::types::Status;

#[component]
pub fn StatusBadge(status: Status) -> impl IntoView {
    view! {
        <span class=format!("status-badge {}", status.css_class())>{status.label()}</span>
    }
}
