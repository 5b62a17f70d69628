use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, ApiRequest};

/// Credentials and cached display fields returned by login/registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub email_code: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendCodeResponse {
    /// Seconds to wait before the code may be requested again. Present
    /// when the server throttles a repeated request.
    #[serde(default)]
    pub wait_time: Option<u64>,
}

pub async fn login(
    api: &ApiClient,
    username: &str,
    password: &str,
) -> Result<AuthTokens, ApiError> {
    api.send_json_unauthenticated(ApiRequest::post(
        "/auth/login",
        serde_json::json!({ "username": username, "password": password }),
    ))
    .await
}

pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<AuthTokens, ApiError> {
    let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
    api.send_json_unauthenticated(ApiRequest::post("/auth/register", body))
        .await
}

pub async fn send_code(api: &ApiClient, email: &str) -> Result<SendCodeResponse, ApiError> {
    api.send_json_unauthenticated(ApiRequest::post(
        "/auth/send-code",
        serde_json::json!({ "email": email }),
    ))
    .await
}
