use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::types::{Experiment, Status, TaskConfigRecord};
use crate::api::{catalog, experiments, ApiClient};
use crate::components::navbar::Navbar;
use crate::components::status_badge::StatusBadge;

/// Landing view: recent experiments, saved configurations and the tasks
/// currently running, all derived from two list calls.
#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();

    let (recent, set_recent) = signal::<Vec<Experiment>>(vec![]);
    let (configs, set_configs) = signal::<Vec<TaskConfigRecord>>(vec![]);
    let (load_error, set_load_error) = signal::<Option<String>>(None);

    Effect::new(move |_| {
        let api = api.clone();
        spawn_local(async move {
            match experiments::list(&api, 1, 5, "").await {
                Ok(page) => set_recent.set(page.results),
                Err(e) => set_load_error.set(Some(e.detail_or("Could not load experiments"))),
            }
            match catalog::task_configs(&api).await {
                Ok(list) => set_configs.set(list),
                Err(e) => set_load_error.set(Some(e.detail_or("Could not load configurations"))),
            }
        });
    });

    let running_tasks = move || {
        recent
            .get()
            .into_iter()
            .flat_map(|exp| {
                let name = exp.name.clone();
                exp.tasks
                    .into_iter()
                    .filter(|t| t.status == Status::Started)
                    .map(move |t| (name.clone(), t))
            })
            .collect::<Vec<_>>()
    };

    view! {
        <div class="page dashboard-page">
            <Navbar />
            {move || load_error.get().map(|e| view! { <p class="form-error">{e}</p> })}

            <div class="card-grid">
                <div class="card">
                    <h3>"Recent experiments"</h3>
                    {move || {
                        let list = recent.get();
                        if list.is_empty() {
                            view! { <p class="empty-hint">"No experiments yet."</p> }.into_any()
                        } else {
                            view! {
                                <ul class="summary-list">
                                    {list
                                        .into_iter()
                                        .map(|exp| view! {
                                            <li>
                                                <a href=format!("/experiment/{}", exp.id)>{exp.name.clone()}</a>
                                                <StatusBadge status=exp.status />
                                            </li>
                                        })
                                        .collect::<Vec<_>>()}
                                </ul>
                            }
                            .into_any()
                        }
                    }}
                    <a href="/experiment" class="btn btn-primary">"All experiments"</a>
                </div>

                <div class="card">
                    <h3>"Saved configurations"</h3>
                    {move || {
                        let list = configs.get();
                        if list.is_empty() {
                            view! { <p class="empty-hint">"No saved configurations."</p> }.into_any()
                        } else {
                            view! {
                                <ul class="summary-list">
                                    {list
                                        .into_iter()
                                        .take(5)
                                        .map(|cfg| view! { <li>{cfg.name.clone()}</li> })
                                        .collect::<Vec<_>>()}
                                </ul>
                            }
                            .into_any()
                        }
                    }}
                    <a href="/configuration" class="btn btn-primary">"All configurations"</a>
                </div>

                <div class="card">
                    <h3>"Running tasks"</h3>
                    {move || {
                        let list = running_tasks();
                        if list.is_empty() {
                            view! { <p class="empty-hint">"Nothing is running."</p> }.into_any()
                        } else {
                            view! {
                                <ul class="summary-list">
                                    {list
                                        .into_iter()
                                        .map(|(experiment, task)| view! {
                                            <li>
                                                <span>{format!("{} / task {}", experiment, task.id)}</span>
                                                <StatusBadge status=task.status />
                                            </li>
                                        })
                                        .collect::<Vec<_>>()}
                                </ul>
                            }
                            .into_any()
                        }
                    }}
                </div>
            </div>
        </div>
    }
}
