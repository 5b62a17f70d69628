use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Lifecycle state shared by experiments and tasks. States the server
/// adds later deserialize as `Unknown` rather than failing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Status {
    Created,
    Started,
    Finished,
    Stopped,
    Error,
    Unknown,
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "created" => Status::Created,
            "started" => Status::Started,
            "finished" => Status::Finished,
            "stopped" => Status::Stopped,
            "error" => Status::Error,
            _ => Status::Unknown,
        }
    }
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::Started => "started",
            Status::Finished => "finished",
            Status::Stopped => "stopped",
            Status::Error => "error",
            Status::Unknown => "unknown",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Status::Created => "status-created",
            Status::Started => "status-started",
            Status::Finished => "status-finished",
            Status::Stopped => "status-stopped",
            Status::Error => "status-error",
            Status::Unknown => "status-unknown",
        }
    }

    pub fn can_start(self) -> bool {
        matches!(self, Status::Created | Status::Stopped | Status::Error)
    }

    pub fn can_stop(self) -> bool {
        matches!(self, Status::Started)
    }
}

/// One configuration value. The shape is algorithm-dependent: scalars for
/// plain parameters, a nested kwargs mapping for pluggable-function
/// arguments. Serialized untagged so the wire format stays plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Kwargs(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    pub fn display(&self) -> String {
        match self {
            ParamValue::Number(n) => n.to_string(),
            ParamValue::Text(s) => s.clone(),
            ParamValue::Kwargs(map) => {
                let entries: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v.display()))
                    .collect();
                entries.join(", ")
            }
        }
    }
}

/// A named, immutable parameter bundle. Tasks embed a snapshot of the
/// configuration they were created from; later edits never reach them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskConfigRecord {
    pub id: u64,
    pub name: String,
    pub config: BTreeMap<String, ParamValue>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    pub id: u64,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
    pub config: TaskConfigRecord,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Experiment {
    pub id: u64,
    pub name: String,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub links: PageLinks,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size)
    }
}

/// Render a server timestamp for display. Accepts RFC 3339 with or without
/// a timezone and falls back to the raw string for anything else.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_deserializes_with_nested_config() {
        let json = r#"{
            "id": 7,
            "name": "rastrigin sweep",
            "status": "started",
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:05:00Z",
            "tasks": [{
                "id": 12,
                "status": "created",
                "created_at": "2025-03-01T10:00:00Z",
                "updated_at": "2025-03-01T10:00:00Z",
                "config": {
                    "id": 3,
                    "name": "baseline",
                    "config": {
                        "algorithm": "classic_ga",
                        "population_size": 200,
                        "mutation_rate": 0.05,
                        "fitness_function": "rastrigin",
                        "fitness_function_kwargs": {"dimensions": 10}
                    }
                }
            }]
        }"#;

        let experiment: Experiment = serde_json::from_str(json).unwrap();
        assert_eq!(experiment.status, Status::Started);
        assert_eq!(experiment.tasks.len(), 1);

        let config = &experiment.tasks[0].config.config;
        assert_eq!(
            config.get("population_size"),
            Some(&ParamValue::Number(200.0))
        );
        assert_eq!(
            config.get("fitness_function"),
            Some(&ParamValue::Text("rastrigin".into()))
        );
        match config.get("fitness_function_kwargs") {
            Some(ParamValue::Kwargs(kwargs)) => {
                assert_eq!(kwargs.get("dimensions"), Some(&ParamValue::Number(10.0)));
            }
            other => panic!("expected kwargs mapping, got {:?}", other),
        }
    }

    #[test]
    fn unknown_status_falls_back() {
        let status: Status = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, Status::Unknown);
    }

    #[test]
    fn status_transitions() {
        assert!(Status::Created.can_start());
        assert!(Status::Stopped.can_start());
        assert!(Status::Error.can_start());
        assert!(!Status::Started.can_start());
        assert!(Status::Started.can_stop());
        assert!(!Status::Finished.can_stop());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Paginated::<Experiment> {
            links: PageLinks {
                next: None,
                previous: None,
            },
            total: 21,
            page: 1,
            page_size: 10,
            results: vec![],
        };
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn timestamps_format_for_display() {
        assert_eq!(
            format_timestamp("2025-03-01T10:00:00Z"),
            "2025-03-01 10:00:00"
        );
        assert_eq!(
            format_timestamp("2025-03-01T10:00:00.123456"),
            "2025-03-01 10:00:00"
        );
        assert_eq!(format_timestamp("not a date"), "not a date");
    }
}
