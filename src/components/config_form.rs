use leptos::prelude::*;

use crate::api::catalog::{FunctionCatalog, FunctionKind, SchemaContext};
use crate::form::{split_params, ConfigDraft};

/// Editable card for one task configuration. The rendered fields follow
/// the schema the server reports for the selected algorithm: one input
/// per scalar parameter, one dropdown per pluggable-function slot, and
/// kwarg inputs appearing under each selected function.
#[component]
pub fn ConfigForm(
    draft: RwSignal<ConfigDraft>,
    /// Called when the user removes this configuration from the draft.
    #[prop(into)]
    on_remove: Callback<()>,
) -> impl IntoView {
    let schema = expect_context::<SchemaContext>().0;
    let algorithm = Memo::new(move |_| draft.with(|d| d.algorithm.clone()));

    view! {
        <div class="config-card">
            <button
                type="button"
                class="btn btn-remove"
                on:click=move |_| on_remove.run(())
            >
                "\u{2715}"
            </button>

            <div class="form-group">
                <label>"Configuration name"</label>
                <input
                    type="text"
                    class="input"
                    placeholder="Configuration name"
                    prop:value=move || draft.with(|d| d.name.clone())
                    on:input=move |ev| {
                        draft.update(|d| d.name = event_target_value(&ev));
                    }
                />
            </div>

            {move || {
                schema.get().map(|schema| {
                    let algorithms: Vec<String> = schema.algorithms.keys().cloned().collect();
                    let schema_for_fields = schema.clone();
                    view! {
                        <div class="form-group">
                            <label>"Algorithm"</label>
                            <select
                                class="input"
                                prop:value=move || algorithm.get()
                                on:change=move |ev| {
                                    draft.update(|d| d.set_algorithm(&event_target_value(&ev)));
                                }
                            >
                                <option value="">"Select an algorithm"</option>
                                {algorithms
                                    .into_iter()
                                    .map(|name| {
                                        let value = name.clone();
                                        view! { <option value=value>{name}</option> }
                                    })
                                    .collect::<Vec<_>>()}
                            </select>
                        </div>

                        // Re-rendered only when the algorithm changes; each
                        // field tracks its own value.
                        {move || {
                            let algo = algorithm.get();
                            if algo.is_empty() {
                                return None;
                            }
                            let params = schema_for_fields.algorithms.get(&algo)?;
                            let (scalars, selectors) = split_params(params);
                            Some(view! {
                                <div class="config-fields">
                                    {selectors
                                        .into_iter()
                                        .map(|kind| view! {
                                            <FunctionSlot
                                                draft=draft
                                                kind=kind
                                                catalog=schema_for_fields.functions.clone()
                                            />
                                        })
                                        .collect::<Vec<_>>()}
                                    {scalars
                                        .into_iter()
                                        .map(|name| view! { <ScalarField draft=draft name=name /> })
                                        .collect::<Vec<_>>()}
                                </div>
                            })
                        }}
                    }
                })
            }}
        </div>
    }
}

#[component]
fn ScalarField(draft: RwSignal<ConfigDraft>, name: String) -> impl IntoView {
    let label = name.replace('_', " ");
    let name_for_value = name.clone();

    view! {
        <div class="form-group">
            <label>{label}</label>
            <input
                type="text"
                class="input"
                prop:value=move || draft.with(|d| d.param(&name_for_value))
                on:input=move |ev| {
                    draft.update(|d| d.set_param(&name, &event_target_value(&ev)));
                }
            />
        </div>
    }
}

/// Dropdown for one pluggable-function slot plus the kwarg inputs of the
/// currently selected function.
#[component]
fn FunctionSlot(
    draft: RwSignal<ConfigDraft>,
    kind: FunctionKind,
    catalog: FunctionCatalog,
) -> impl IntoView {
    let selected = Memo::new(move |_| draft.with(|d| d.function_name(kind)));
    let options: Vec<String> = catalog.functions(kind).keys().cloned().collect();

    view! {
        <div class="form-group">
            <label>{kind.label()}</label>
            <select
                class="input"
                prop:value=move || selected.get()
                on:change=move |ev| {
                    draft.update(|d| d.set_function(kind, &event_target_value(&ev)));
                }
            >
                <option value="">"Select a function"</option>
                {options
                    .into_iter()
                    .map(|name| {
                        let value = name.clone();
                        view! { <option value=value>{name}</option> }
                    })
                    .collect::<Vec<_>>()}
            </select>

            {move || {
                let name = selected.get();
                if name.is_empty() {
                    return None;
                }
                catalog.kwargs(kind, &name).map(|kwargs| {
                    view! {
                        <div class="kwargs">
                            {kwargs
                                .iter()
                                .map(|kwarg| view! {
                                    <KwargField draft=draft kind=kind kwarg=kwarg.clone() />
                                })
                                .collect::<Vec<_>>()}
                        </div>
                    }
                })
            }}
        </div>
    }
}

#[component]
fn KwargField(draft: RwSignal<ConfigDraft>, kind: FunctionKind, kwarg: String) -> impl IntoView {
    let label = kwarg.replace('_', " ");
    let kwarg_for_value = kwarg.clone();

    view! {
        <div class="form-group form-group-kwarg">
            <label>{label}</label>
            <input
                type="text"
                class="input"
                prop:value=move || draft.with(|d| d.kwarg(kind, &kwarg_for_value))
                on:input=move |ev| {
                    draft.update(|d| d.set_kwarg(kind, &kwarg, &event_target_value(&ev)));
                }
            />
        </div>
    }
}
