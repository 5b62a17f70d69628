use std::collections::BTreeMap;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::catalog::{self, FunctionCatalog, FunctionKind};
use crate::api::ApiClient;
use crate::components::navbar::Navbar;

/// Catalog browser: every server-registered pluggable function grouped by
/// category, with its keyword-argument schema and translated display name
/// where one exists.
#[component]
pub fn FunctionsPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();

    let (functions, set_functions) = signal::<Option<FunctionCatalog>>(None);
    let (labels, set_labels) = signal::<BTreeMap<String, String>>(BTreeMap::new());
    let (load_error, set_load_error) = signal::<Option<String>>(None);

    Effect::new(move |_| {
        let api = api.clone();
        spawn_local(async move {
            match catalog::function_catalog(&api).await {
                Ok(cat) => set_functions.set(Some(cat)),
                Err(e) => {
                    set_load_error.set(Some(e.detail_or("Could not load the function catalog")));
                    return;
                }
            }
            // Translations are cosmetic; fall back to raw names.
            match catalog::translations(&api).await {
                Ok(map) => set_labels.set(map),
                Err(e) => leptos::logging::warn!("translations unavailable: {}", e),
            }
        });
    });

    let display_name = move |raw: &str| {
        labels
            .with(|map| map.get(raw).cloned())
            .unwrap_or_else(|| raw.to_string())
    };

    view! {
        <div class="page functions-page">
            <Navbar />
            <h2>"Function catalog"</h2>
            {move || load_error.get().map(|e| view! { <p class="form-error">{e}</p> })}

            {move || match functions.get() {
                None => view! { <p class="empty-hint">"Loading..."</p> }.into_any(),
                Some(catalog) => {
                    view! {
                        {FunctionKind::ALL
                            .iter()
                            .filter(|kind| !catalog.functions(**kind).is_empty())
                            .map(|kind| {
                                let entries = catalog.functions(*kind).clone();
                                view! {
                                    <section class="function-section">
                                        <h3>{kind.label()}</h3>
                                        <ul class="function-list">
                                            {entries
                                                .into_iter()
                                                .map(|(name, kwargs)| {
                                                    let label = display_name(&name);
                                                    let kwargs_text = if kwargs.is_empty() {
                                                        "no keyword arguments".to_string()
                                                    } else {
                                                        kwargs.join(", ")
                                                    };
                                                    view! {
                                                        <li>
                                                            <span class="function-name">{label}</span>
                                                            <span class="function-kwargs">{kwargs_text}</span>
                                                        </li>
                                                    }
                                                })
                                                .collect::<Vec<_>>()}
                                        </ul>
                                    </section>
                                }
                            })
                            .collect::<Vec<_>>()}
                    }
                    .into_any()
                }
            }}
        </div>
    }
}
