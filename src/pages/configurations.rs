use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::types::TaskConfigRecord;
use crate::api::{catalog, ApiClient};
use crate::components::navbar::Navbar;

/// Read-only list of the user's saved task configurations with their
/// parameter snapshots.
#[component]
pub fn ConfigurationsPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();

    let (configs, set_configs) = signal::<Vec<TaskConfigRecord>>(vec![]);
    let (is_loading, set_is_loading) = signal(true);
    let (load_error, set_load_error) = signal::<Option<String>>(None);

    Effect::new(move |_| {
        let api = api.clone();
        spawn_local(async move {
            match catalog::task_configs(&api).await {
                Ok(list) => {
                    set_configs.set(list);
                    set_load_error.set(None);
                }
                Err(e) => {
                    set_load_error.set(Some(e.detail_or("Could not load configurations")));
                }
            }
            set_is_loading.set(false);
        });
    });

    view! {
        <div class="page configurations-page">
            <Navbar />
            <h2>"Configurations"</h2>
            {move || load_error.get().map(|e| view! { <p class="form-error">{e}</p> })}

            {move || {
                if is_loading.get() {
                    return view! { <p class="empty-hint">"Loading..."</p> }.into_any();
                }
                let list = configs.get();
                if list.is_empty() {
                    return view! { <p class="empty-hint">"No saved configurations."</p> }
                        .into_any();
                }
                view! {
                    <div class="card-grid">
                        {list
                            .into_iter()
                            .map(|cfg| view! {
                                <div class="card config-card">
                                    <h3>{cfg.name.clone()}</h3>
                                    <ul class="param-list">
                                        {cfg.config
                                            .iter()
                                            .map(|(param, value)| view! {
                                                <li>
                                                    <span class="param-name">{param.clone()}</span>
                                                    <span class="param-value">{value.display()}</span>
                                                </li>
                                            })
                                            .collect::<Vec<_>>()}
                                    </ul>
                                </div>
                            })
                            .collect::<Vec<_>>()}
                    </div>
                }
                .into_any()
            }}
        </div>
    }
}
