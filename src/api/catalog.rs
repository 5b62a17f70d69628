use std::collections::BTreeMap;

use leptos::prelude::RwSignal;
use serde::Deserialize;

use super::types::TaskConfigRecord;
use super::{ApiClient, ApiError, ApiRequest, Detail};

/// The pluggable-function categories a configuration can select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FunctionKind {
    Fitness,
    Selection,
    Mutation,
    Crossover,
    Initialization,
    Termination,
    Adaptation,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 7] = [
        FunctionKind::Fitness,
        FunctionKind::Selection,
        FunctionKind::Mutation,
        FunctionKind::Crossover,
        FunctionKind::Initialization,
        FunctionKind::Termination,
        FunctionKind::Adaptation,
    ];

    /// The configuration parameter that selects a function of this kind.
    pub fn selector_param(self) -> &'static str {
        match self {
            FunctionKind::Fitness => "fitness_function",
            FunctionKind::Selection => "selection_function",
            FunctionKind::Mutation => "mutation_function",
            FunctionKind::Crossover => "crossover_function",
            FunctionKind::Initialization => "initialize_population_function",
            FunctionKind::Termination => "termination_function",
            FunctionKind::Adaptation => "adaptation_function",
        }
    }

    /// Inverse of `selector_param`; tells selector parameters apart from
    /// plain scalar ones when rendering a form.
    pub fn from_param(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.selector_param() == name)
    }

    pub fn label(self) -> &'static str {
        match self {
            FunctionKind::Fitness => "Fitness function",
            FunctionKind::Selection => "Selection function",
            FunctionKind::Mutation => "Mutation function",
            FunctionKind::Crossover => "Crossover function",
            FunctionKind::Initialization => "Initialization function",
            FunctionKind::Termination => "Termination function",
            FunctionKind::Adaptation => "Adaptation function",
        }
    }
}

/// Server-registered pluggable functions: per category, function name to
/// its ordered keyword-argument names.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionCatalog {
    #[serde(default)]
    pub fitness_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub selection_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub mutation_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub crossover_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub init_population_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub termination_functions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub adaptation_functions: BTreeMap<String, Vec<String>>,
}

impl FunctionCatalog {
    pub fn functions(&self, kind: FunctionKind) -> &BTreeMap<String, Vec<String>> {
        match kind {
            FunctionKind::Fitness => &self.fitness_functions,
            FunctionKind::Selection => &self.selection_functions,
            FunctionKind::Mutation => &self.mutation_functions,
            FunctionKind::Crossover => &self.crossover_functions,
            FunctionKind::Initialization => &self.init_population_functions,
            FunctionKind::Termination => &self.termination_functions,
            FunctionKind::Adaptation => &self.adaptation_functions,
        }
    }

    /// Keyword-argument names for one registered function, if it exists.
    pub fn kwargs(&self, kind: FunctionKind, name: &str) -> Option<&[String]> {
        self.functions(kind).get(name).map(Vec::as_slice)
    }
}

/// Everything the dynamic configuration form needs: algorithms with their
/// ordered parameter lists, plus the pluggable-function catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub algorithms: BTreeMap<String, Vec<String>>,
    pub functions: FunctionCatalog,
}

/// App-wide cache for the schema; fetched once and reused across views.
#[derive(Clone, Copy)]
pub struct SchemaContext(pub RwSignal<Option<Schema>>);

pub async fn supported_algorithms(
    api: &ApiClient,
) -> Result<BTreeMap<String, Vec<String>>, ApiError> {
    let resp: Detail<BTreeMap<String, Vec<String>>> = api
        .send_json(ApiRequest::get("/task_module/get_supported_algorithms"))
        .await?;
    Ok(resp.detail)
}

pub async fn function_catalog(api: &ApiClient) -> Result<FunctionCatalog, ApiError> {
    let resp: Detail<FunctionCatalog> = api
        .send_json(ApiRequest::get("/task_module/math_function"))
        .await?;
    Ok(resp.detail)
}

pub async fn load_schema(api: &ApiClient) -> Result<Schema, ApiError> {
    let algorithms = supported_algorithms(api).await?;
    let functions = function_catalog(api).await?;
    Ok(Schema {
        algorithms,
        functions,
    })
}

pub async fn task_configs(api: &ApiClient) -> Result<Vec<TaskConfigRecord>, ApiError> {
    let resp: Detail<Vec<TaskConfigRecord>> = api
        .send_json(ApiRequest::get("/task_module/task_config"))
        .await?;
    Ok(resp.detail)
}

/// Display-name translations for algorithms, functions and parameters.
/// Served as a flat key-to-label map.
pub async fn translations(api: &ApiClient) -> Result<BTreeMap<String, String>, ApiError> {
    api.send_json(ApiRequest::get("/task_module/translations"))
        .await
}
