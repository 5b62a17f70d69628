use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params_map};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::api::experiments::{self, ExportFormat};
use crate::api::types::{format_timestamp, Experiment, Status, Task};
use crate::api::ApiClient;
use crate::components::navbar::Navbar;
use crate::components::notification::{Notice, Notification};
use crate::components::status_badge::StatusBadge;

/// Hand a fetched result to the browser as a file download.
fn download_bytes(filename: &str, mime: &str, bytes: &[u8]) -> Result<(), String> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array.buffer());

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| format!("{e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|_| "not an anchor element".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

#[component]
pub fn ExperimentDetailsPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();
    let navigate = use_navigate();
    let params = use_params_map();

    let experiment_id = Memo::new(move |_| {
        params
            .with(|p| p.get("id"))
            .and_then(|raw| raw.parse::<u64>().ok())
    });

    let (experiment, set_experiment) = signal::<Option<Experiment>>(None);
    let (new_name, set_new_name) = signal(String::new());
    let (is_editing, set_is_editing) = signal(false);
    let (notice, set_notice) = signal::<Option<Notice>>(None);

    // Load details whenever the route id changes.
    let load_api = api.clone();
    Effect::new(move |_| {
        let Some(id) = experiment_id.get() else {
            return;
        };
        let api = load_api.clone();
        spawn_local(async move {
            match experiments::get(&api, id).await {
                Ok(exp) => {
                    set_new_name.set(exp.name.clone());
                    set_experiment.set(Some(exp));
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not load the experiment"),
                    )));
                }
            }
        });
    });

    // Mirror a successful start/stop into the cached experiment so the row
    // updates without a refetch.
    let set_task_status = move |task_id: u64, status: Status| {
        set_experiment.update(|exp| {
            if let Some(exp) = exp {
                for task in &mut exp.tasks {
                    if task.id == task_id {
                        task.status = status;
                    }
                }
            }
        });
    };

    let start_api = api.clone();
    let start_task = Callback::new(move |task_id: u64| {
        let Some(id) = experiment_id.get_untracked() else {
            return;
        };
        let api = start_api.clone();
        spawn_local(async move {
            match experiments::start_task(&api, id, task_id).await {
                Ok(()) => {
                    set_task_status(task_id, Status::Started);
                    set_notice.set(Some(Notice::success("Task started")));
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(e.detail_or("Could not start the task"))));
                }
            }
        });
    });

    let stop_api = api.clone();
    let stop_task = Callback::new(move |task_id: u64| {
        let Some(id) = experiment_id.get_untracked() else {
            return;
        };
        let api = stop_api.clone();
        spawn_local(async move {
            match experiments::stop_task(&api, id, task_id).await {
                Ok(()) => {
                    set_task_status(task_id, Status::Stopped);
                    set_notice.set(Some(Notice::success("Task stopped")));
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(e.detail_or("Could not stop the task"))));
                }
            }
        });
    });

    let export_api = api.clone();
    let export_task = Callback::new(move |(task_id, format): (u64, ExportFormat)| {
        let Some(id) = experiment_id.get_untracked() else {
            return;
        };
        let api = export_api.clone();
        spawn_local(async move {
            match experiments::export_result(&api, id, task_id, format).await {
                Ok(bytes) => {
                    let filename =
                        format!("task_{}_result.{}", task_id, format.file_extension());
                    if let Err(e) = download_bytes(&filename, format.mime(), &bytes) {
                        leptos::logging::error!("download failed: {}", e);
                        set_notice.set(Some(Notice::error("Could not save the file")));
                    }
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(e.detail_or("Export failed"))));
                }
            }
        });
    });

    let rename_api = api.clone();
    let rename = Callback::new(move |_: ()| {
        let name = new_name.get_untracked();
        if name.trim().is_empty() {
            set_notice.set(Some(Notice::error("The name must not be empty")));
            return;
        }
        let Some(id) = experiment_id.get_untracked() else {
            return;
        };
        let api = rename_api.clone();
        spawn_local(async move {
            match experiments::rename(&api, id, name.trim()).await {
                Ok(()) => {
                    set_experiment.update(|exp| {
                        if let Some(exp) = exp {
                            exp.name = name.trim().to_string();
                        }
                    });
                    set_is_editing.set(false);
                    set_notice.set(Some(Notice::success("Experiment renamed")));
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not rename the experiment"),
                    )));
                }
            }
        });
    });

    let delete_api = api.clone();
    let delete = Callback::new(move |_: ()| {
        let Some(id) = experiment_id.get_untracked() else {
            return;
        };
        let api = delete_api.clone();
        let navigate = navigate.clone();
        spawn_local(async move {
            match experiments::delete(&api, id).await {
                Ok(()) => navigate("/experiment", Default::default()),
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not delete the experiment"),
                    )));
                }
            }
        });
    });

    view! {
        <div class="page experiment-details-page">
            <Navbar />
            <Notification notice=notice set_notice=set_notice />

            {move || match experiment.get() {
                None => view! { <p class="empty-hint">"Loading..."</p> }.into_any(),
                Some(exp) => {
                    view! {
                        <div class="experiment-header">
                            <h2>{exp.name.clone()}</h2>
                            <StatusBadge status=exp.status />
                            <p class="experiment-meta">
                                {format!("Created {}", format_timestamp(&exp.created_at))}
                            </p>
                            <p class="experiment-meta">
                                {format!("Updated {}", format_timestamp(&exp.updated_at))}
                            </p>

                            <div class="toolbar">
                                <button
                                    class="btn"
                                    on:click=move |_| set_is_editing.update(|e| *e = !*e)
                                >
                                    {move || if is_editing.get() { "Cancel" } else { "Rename" }}
                                </button>
                                <button class="btn btn-danger" on:click=move |_| delete.run(())>
                                    "Delete"
                                </button>
                            </div>

                            <Show when=move || is_editing.get()>
                                <div class="rename-row">
                                    <input
                                        type="text"
                                        class="input"
                                        prop:value=move || new_name.get()
                                        on:input=move |ev| set_new_name.set(event_target_value(&ev))
                                    />
                                    <button class="btn btn-primary" on:click=move |_| rename.run(())>
                                        "Save"
                                    </button>
                                </div>
                            </Show>
                        </div>

                        <h3>"Tasks"</h3>
                        <ul class="task-list">
                            {exp.tasks
                                .iter()
                                .map(|task| task_row(task, start_task, stop_task, export_task))
                                .collect::<Vec<_>>()}
                        </ul>
                    }
                    .into_any()
                }
            }}
        </div>
    }
}

fn task_row(
    task: &Task,
    start_task: Callback<u64>,
    stop_task: Callback<u64>,
    export_task: Callback<(u64, ExportFormat)>,
) -> impl IntoView {
    let id = task.id;
    let status = task.status;
    let config_json =
        serde_json::to_string_pretty(&task.config.config).unwrap_or_else(|_| "{}".to_string());

    view! {
        <li class="task-row">
            <div class="task-header">
                <span class="task-title">{format!("Task {id} ({})", task.config.name)}</span>
                <StatusBadge status=status />
            </div>
            <pre class="config-snapshot">{config_json}</pre>
            <div class="task-actions">
                <Show when=move || status.can_start()>
                    <button class="btn btn-primary" on:click=move |_| start_task.run(id)>
                        "Start"
                    </button>
                </Show>
                <Show when=move || status.can_stop()>
                    <button class="btn btn-danger" on:click=move |_| stop_task.run(id)>
                        "Stop"
                    </button>
                </Show>
                <Show when=move || status == Status::Finished>
                    <span class="export-label">"Export:"</span>
                    {ExportFormat::ALL
                        .iter()
                        .map(|format| {
                            let format = *format;
                            view! {
                                <button
                                    class="btn btn-export"
                                    on:click=move |_| export_task.run((id, format))
                                >
                                    {format.query_value().to_uppercase()}
                                </button>
                            }
                        })
                        .collect::<Vec<_>>()}
                </Show>
            </div>
        </li>
    }
}
