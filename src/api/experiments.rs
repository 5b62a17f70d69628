use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Experiment, Paginated, ParamValue};
use super::{ApiClient, ApiError, ApiRequest, Detail};

#[derive(Debug, Clone, Serialize)]
pub struct NewConfig {
    pub name: String,
    pub config: BTreeMap<String, ParamValue>,
}

/// Export formats for task results; the server picks the encoding from a
/// query flag and answers with a binary body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Json];

    pub fn query_value(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    pub fn file_extension(self) -> &'static str {
        self.query_value()
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }
}

pub async fn list(
    api: &ApiClient,
    page: u64,
    page_size: u64,
    search: &str,
) -> Result<Paginated<Experiment>, ApiError> {
    let mut request = ApiRequest::get("/task_module/experiment")
        .with_query("page", page.to_string())
        .with_query("page_size", page_size.to_string());
    if !search.trim().is_empty() {
        request = request.with_query("search", search.trim());
    }
    api.send_json(request).await
}

pub async fn get(api: &ApiClient, id: u64) -> Result<Experiment, ApiError> {
    api.send_json(ApiRequest::get(format!("/task_module/experiment/{id}")))
        .await
}

/// Create an experiment with one task per configuration; returns the new
/// experiment's id.
pub async fn create(api: &ApiClient, name: &str, configs: &[NewConfig]) -> Result<u64, ApiError> {
    let resp: Detail<u64> = api
        .send_json(ApiRequest::post(
            "/task_module/experiment",
            serde_json::json!({ "name": name, "configs": configs }),
        ))
        .await?;
    Ok(resp.detail)
}

pub async fn rename(api: &ApiClient, id: u64, name: &str) -> Result<(), ApiError> {
    api.send(ApiRequest::patch(
        format!("/task_module/experiment/{id}"),
        serde_json::json!({ "name": name }),
    ))
    .await
    .map(|_| ())
}

pub async fn delete(api: &ApiClient, id: u64) -> Result<(), ApiError> {
    api.send(ApiRequest::delete(format!("/task_module/experiment/{id}")))
        .await
        .map(|_| ())
}

pub async fn start_task(api: &ApiClient, experiment_id: u64, task_id: u64) -> Result<(), ApiError> {
    api.send(
        ApiRequest::get(format!(
            "/task_module/experiment/{experiment_id}/task/{task_id}"
        ))
        .with_query("start", "true"),
    )
    .await
    .map(|_| ())
}

pub async fn stop_task(api: &ApiClient, experiment_id: u64, task_id: u64) -> Result<(), ApiError> {
    api.send(
        ApiRequest::get(format!(
            "/task_module/experiment/{experiment_id}/task/{task_id}"
        ))
        .with_query("stop", "true"),
    )
    .await
    .map(|_| ())
}

/// Fetch a finished task's result in the requested format. The body is
/// returned as raw bytes for the browser-download path.
pub async fn export_result(
    api: &ApiClient,
    experiment_id: u64,
    task_id: u64,
    format: ExportFormat,
) -> Result<Vec<u8>, ApiError> {
    let resp = api
        .send(
            ApiRequest::get(format!(
                "/task_module/experiment/{experiment_id}/task/{task_id}/export_result"
            ))
            .with_query("format", format.query_value()),
        )
        .await?;
    Ok(resp.body)
}

/// Launch every task of each selected experiment in one call.
pub async fn multiple_launch(api: &ApiClient, experiment_ids: &[u64]) -> Result<(), ApiError> {
    api.send(ApiRequest::post(
        "/task_module/multiple_launch",
        serde_json::json!({ "experiment_ids": experiment_ids }),
    ))
    .await
    .map(|_| ())
}
