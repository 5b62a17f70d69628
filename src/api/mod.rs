pub mod auth;
pub mod catalog;
pub mod client;
pub mod experiments;
pub mod types;

pub use client::{ApiClient, ApiError, ApiRequest};

use serde::Deserialize;

/// Many endpoints wrap their payload in a `detail` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Detail<T> {
    pub detail: T,
}
