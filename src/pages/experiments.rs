use std::collections::BTreeSet;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::api::types::{format_timestamp, Experiment};
use crate::api::{experiments, ApiClient};
use crate::components::navbar::Navbar;
use crate::components::notification::{Notice, Notification};
use crate::components::status_badge::StatusBadge;

const PAGE_SIZES: [u64; 3] = [10, 25, 50];

/// Paginated, searchable experiment list with multi-select launch.
#[component]
pub fn ExperimentsPage() -> impl IntoView {
    let api = expect_context::<ApiClient>();

    let (items, set_items) = signal::<Vec<Experiment>>(vec![]);
    let (page, set_page) = signal(1u64);
    let (page_size, set_page_size) = signal(10u64);
    let (total, set_total) = signal(0u64);
    let (search, set_search) = signal(String::new());
    let (selected, set_selected) = signal::<BTreeSet<u64>>(BTreeSet::new());
    let (notice, set_notice) = signal::<Option<Notice>>(None);

    // Refetch whenever page, page size or the search query changes.
    let fetch_api = api.clone();
    Effect::new(move |_| {
        let api = fetch_api.clone();
        let page = page.get();
        let page_size = page_size.get();
        let search = search.get();
        spawn_local(async move {
            match experiments::list(&api, page, page_size, &search).await {
                Ok(result) => {
                    set_total.set(result.total);
                    set_items.set(result.results);
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(
                        e.detail_or("Could not load experiments"),
                    )));
                }
            }
        });
    });

    let total_pages = move || {
        let size = page_size.get().max(1);
        total.get().div_ceil(size).max(1)
    };

    let toggle_selected = move |id: u64| {
        set_selected.update(|set| {
            if !set.remove(&id) {
                set.insert(id);
            }
        });
    };

    let launch_api = api.clone();
    let launch_selected = move |_| {
        let api = launch_api.clone();
        let ids: Vec<u64> = selected.get().into_iter().collect();
        if ids.is_empty() {
            set_notice.set(Some(Notice::error("Select at least one experiment")));
            return;
        }
        spawn_local(async move {
            match experiments::multiple_launch(&api, &ids).await {
                Ok(()) => {
                    set_notice.set(Some(Notice::success(format!(
                        "Launched {} experiment(s)",
                        ids.len()
                    ))));
                    set_selected.set(BTreeSet::new());
                }
                Err(e) => {
                    set_notice.set(Some(Notice::error(e.detail_or("Launch failed"))));
                }
            }
        });
    };

    view! {
        <div class="page experiments-page">
            <Navbar />
            <Notification notice=notice set_notice=set_notice />

            <div class="toolbar">
                <a href="/create-experiment" class="btn btn-primary">"New experiment"</a>
                <button class="btn" on:click=launch_selected>"Launch selected"</button>
                <input
                    type="text"
                    class="input search-input"
                    placeholder="Search"
                    prop:value=move || search.get()
                    on:input=move |ev| {
                        set_search.set(event_target_value(&ev));
                        set_page.set(1);
                    }
                />
            </div>

            <h2>"Experiments"</h2>
            {move || {
                let list = items.get();
                if list.is_empty() {
                    return view! { <p class="empty-hint">"No experiments found."</p> }.into_any();
                }
                view! {
                    <ul class="experiment-list">
                        {list
                            .into_iter()
                            .map(|exp| {
                                let id = exp.id;
                                view! {
                                    <li class="experiment-row">
                                        <input
                                            type="checkbox"
                                            prop:checked=move || selected.with(|s| s.contains(&id))
                                            on:change=move |_| toggle_selected(id)
                                        />
                                        <a href=format!("/experiment/{id}") class="experiment-name">
                                            {exp.name.clone()}
                                        </a>
                                        <StatusBadge status=exp.status />
                                        <span class="experiment-meta">
                                            {format!(
                                                "{} task(s), created {}",
                                                exp.tasks.len(),
                                                format_timestamp(&exp.created_at),
                                            )}
                                        </span>
                                    </li>
                                }
                            })
                            .collect::<Vec<_>>()}
                    </ul>
                }
                .into_any()
            }}

            <div class="pagination">
                <button
                    class="btn"
                    disabled=move || page.get() <= 1
                    on:click=move |_| set_page.update(|p| *p = p.saturating_sub(1).max(1))
                >
                    "Previous"
                </button>
                <span>{move || format!("Page {} of {}", page.get(), total_pages())}</span>
                <button
                    class="btn"
                    disabled=move || page.get() >= total_pages()
                    on:click=move |_| set_page.update(|p| *p += 1)
                >
                    "Next"
                </button>
                <select
                    class="input page-size-select"
                    on:change=move |ev| {
                        if let Ok(size) = event_target_value(&ev).parse::<u64>() {
                            set_page_size.set(size);
                            set_page.set(1);
                        }
                    }
                >
                    {PAGE_SIZES
                        .iter()
                        .map(|size| view! {
                            <option value=size.to_string() selected=*size == 10>
                                {format!("{size} per page")}
                            </option>
                        })
                        .collect::<Vec<_>>()}
                </select>
            </div>
        </div>
    }
}
