use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::spawn_local;

use crate::api::catalog::{self, SchemaContext};
use crate::api::experiments::{self, NewConfig};
use crate::api::ApiClient;
use crate::components::config_form::ConfigForm;
use crate::components::navbar::Navbar;
use crate::components::notification::{Notice, Notification};
use crate::form::{build_payload, validate_experiment, ConfigDraft};

const MAX_CONFIGS: usize = 4;

/// Compose a new experiment from a name and up to four configurations,
/// each edited through the schema-driven form.
#[component]
pub fn CreateExperimentPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let schema = expect_context::<SchemaContext>().0;
    let navigate = use_navigate();

    let (name, set_name) = signal(String::new());
    let (drafts, set_drafts) = signal::<Vec<RwSignal<ConfigDraft>>>(vec![]);
    let (notice, set_notice) = signal::<Option<Notice>>(None);

    // The schema is fetched once and cached app-wide.
    let schema_api = api.clone();
    Effect::new(move |_| {
        if schema.get_untracked().is_some() {
            return;
        }
        let api = schema_api.clone();
        spawn_local(async move {
            match catalog::load_schema(&api).await {
                Ok(loaded) => schema.set(Some(loaded)),
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not load the algorithm schema"),
                    )));
                }
            }
        });
    });

    let add_config = move |_| {
        set_drafts.update(|list| {
            if list.len() < MAX_CONFIGS {
                list.push(RwSignal::new(ConfigDraft::default()));
            }
        });
    };

    let submit_api = api.clone();
    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let current: Vec<ConfigDraft> = drafts.get().iter().map(|d| d.get()).collect();
        let experiment_name = name.get();

        if let Err(problem) = validate_experiment(&experiment_name, &current) {
            set_notice.set(Some(Notice::error(problem)));
            return;
        }

        let configs: Vec<NewConfig> = current
            .iter()
            .map(|draft| NewConfig {
                name: draft.name.trim().to_string(),
                config: build_payload(draft),
            })
            .collect();

        let api = submit_api.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match experiments::create(&api, experiment_name.trim(), &configs).await {
                Ok(id) => navigate(&format!("/experiment/{id}"), Default::default()),
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not create the experiment"),
                    )));
                }
            }
        });
    };

    view! {
        <div class="page create-experiment-page">
            <Navbar />
            <Notification notice=notice set_notice=set_notice />

            <h2>"New experiment"</h2>
            <form on:submit=submit>
                <div class="form-group">
                    <label>"Experiment name"</label>
                    <input
                        type="text"
                        class="input"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                </div>

                <div class="config-grid">
                    {move || {
                        drafts
                            .get()
                            .into_iter()
                            .enumerate()
                            .map(|(index, draft)| {
                                view! {
                                    <ConfigForm
                                        draft=draft
                                        on_remove=move |_: ()| {
                                            set_drafts.update(|list| {
                                                if index < list.len() {
                                                    list.remove(index);
                                                }
                                            });
                                        }
                                    />
                                }
                            })
                            .collect::<Vec<_>>()
                    }}

                    <Show when=move || drafts.with(|d| d.len() < MAX_CONFIGS)>
                        <button type="button" class="btn btn-add" on:click=add_config>
                            "+ Add configuration"
                        </button>
                    </Show>
                </div>

                <button type="submit" class="btn btn-primary">"Create experiment"</button>
            </form>
        </div>
    }
}
