use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::session::SessionStore;

/// Errors surfaced by the request client.
///
/// `Status` carries the server's `detail` message when the response body
/// had one; views turn that into a user-visible notification.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("server returned {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The server-provided detail message, or `fallback` when there is none.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// A logical outbound call, described independently of any HTTP library.
/// Paths are relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }
}

/// Status and raw body of a completed request. Export endpoints return
/// binary payloads, so the body stays as bytes until a caller asks for JSON.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// The `detail` field of a JSON error body, if present.
    pub fn detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Transport seam: executes one request with an optional bearer credential.
/// The browser build goes through reqwest; tests swap in a scripted mock.
/// The returned futures need not be `Send` (requests run on the main
/// thread), but the transport itself is shared across view closures.
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ApiError>;
}

pub struct HttpTransport {
    base: String,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let full = format!("{}{}", self.base, request.path);
        let url = if request.query.is_empty() {
            Url::parse(&full)
        } else {
            Url::parse_with_params(&full, &request.query)
        };
        url.map_err(|e| ApiError::Transport(format!("invalid URL '{}': {}", full, e)))
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.endpoint(request)?;
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Outcome of a single send, before any recovery. 401 is kept apart from
/// other failures because it is the only recoverable one.
enum SendOutcome {
    Ok(RawResponse),
    AuthExpired(RawResponse),
    Failed(ApiError),
}

fn classify(result: Result<RawResponse, ApiError>) -> SendOutcome {
    match result {
        Ok(resp) if resp.status == 401 => SendOutcome::AuthExpired(resp),
        Ok(resp) if (200..300).contains(&resp.status) => SendOutcome::Ok(resp),
        Ok(resp) => SendOutcome::Failed(ApiError::Status {
            status: resp.status,
            detail: resp.detail(),
        }),
        Err(e) => SendOutcome::Failed(e),
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Request client that attaches the current access token as a bearer
/// credential and recovers from expiry with a one-shot refresh protocol:
///
/// - First 401 with a refresh token present: `POST /auth/refresh`, store
///   the new access token, replay the original request exactly once.
/// - First 401 without a refresh token: propagate the 401 untouched and
///   never call the refresh endpoint.
/// - 401 on the replay: returned as a plain status error, never retried
///   a second time.
/// - Refresh call failure: fire the session-invalidated hook (the app
///   shell navigates to the login view) and propagate the refresh error.
///   No tokens are cleared here; that is the caller's decision.
///
/// Concurrent requests that each hit a 401 each run their own refresh;
/// refreshes are not coalesced.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    on_session_invalidated: Arc<dyn Fn() + Send + Sync>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionStore,
        on_session_invalidated: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self {
            transport,
            session,
            on_session_invalidated,
        }
    }

    pub fn with_base(
        base: &str,
        session: SessionStore,
        on_session_invalidated: Arc<dyn Fn() + Send + Sync>,
    ) -> Self {
        Self::new(Arc::new(HttpTransport::new(base)), session, on_session_invalidated)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    async fn send_once(&self, request: &ApiRequest) -> SendOutcome {
        let bearer = self.session.access_token();
        classify(self.transport.execute(request, bearer.as_deref()).await)
    }

    /// Send a request through the full attach-refresh-replay protocol.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        match self.send_once(&request).await {
            SendOutcome::Ok(resp) => Ok(resp),
            SendOutcome::Failed(e) => Err(e),
            SendOutcome::AuthExpired(first) => self.refresh_and_replay(&request, first).await,
        }
    }

    /// Send and decode a JSON response body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Send with no bearer credential and no 401 recovery. Auth endpoints
    /// use this path: they establish a session instead of using one, so a
    /// 401 from them means bad credentials, not an expired token.
    pub async fn send_unauthenticated(
        &self,
        request: ApiRequest,
    ) -> Result<RawResponse, ApiError> {
        match classify(self.transport.execute(&request, None).await) {
            SendOutcome::Ok(resp) => Ok(resp),
            SendOutcome::AuthExpired(resp) => Err(ApiError::Status {
                status: resp.status,
                detail: resp.detail(),
            }),
            SendOutcome::Failed(e) => Err(e),
        }
    }

    pub async fn send_json_unauthenticated<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        self.send_unauthenticated(request).await?.json()
    }

    async fn refresh_and_replay(
        &self,
        request: &ApiRequest,
        first: RawResponse,
    ) -> Result<RawResponse, ApiError> {
        let Some(refresh) = self.session.refresh_token() else {
            // Nothing to recover with; the caller handles the
            // unauthenticated state.
            return Err(ApiError::Status {
                status: first.status,
                detail: first.detail(),
            });
        };

        let access = match self.refresh_access_token(&refresh).await {
            Ok(access) => access,
            Err(e) => {
                (self.on_session_invalidated)();
                return Err(e);
            }
        };
        self.session.set_access_token(&access);

        match self.send_once(request).await {
            SendOutcome::Ok(resp) => Ok(resp),
            // A request that failed with 401 twice is never retried again.
            SendOutcome::AuthExpired(resp) => Err(ApiError::Status {
                status: resp.status,
                detail: resp.detail(),
            }),
            SendOutcome::Failed(e) => Err(e),
        }
    }

    async fn refresh_access_token(&self, refresh: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post(
            "/auth/refresh",
            serde_json::json!({ "refresh": refresh }),
        );
        // The refresh call itself carries no bearer credential.
        let resp = self.transport.execute(&request, None).await?;
        if !(200..300).contains(&resp.status) {
            return Err(ApiError::Status {
                status: resp.status,
                detail: resp.detail(),
            });
        }
        let parsed: RefreshResponse = resp.json()?;
        Ok(parsed.access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::MemoryStorage;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Scripted transport: pops one canned result per request and records
    /// every request together with the bearer token it was sent with.
    #[derive(Default)]
    struct MockTransport {
        responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockTransport {
        fn push(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: body.as_bytes().to_vec(),
            }));
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait(?Send)]
    impl Transport for MockTransport {
        async fn execute(
            &self,
            request: &ApiRequest,
            bearer: Option<&str>,
        ) -> Result<RawResponse, ApiError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.path.clone(), bearer.map(str::to_string)));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock transport ran out of scripted responses")
        }
    }

    struct Harness {
        transport: Arc<MockTransport>,
        session: SessionStore,
        invalidated: Arc<AtomicBool>,
        client: ApiClient,
    }

    impl Harness {
        fn invalidated(&self) -> bool {
            self.invalidated.load(Ordering::SeqCst)
        }
    }

    fn harness() -> Harness {
        let transport = Arc::new(MockTransport::default());
        let session = SessionStore::with_storage(Arc::new(MemoryStorage::default()));
        let invalidated = Arc::new(AtomicBool::new(false));
        let flag = invalidated.clone();
        let client = ApiClient::new(
            transport.clone(),
            session.clone(),
            Arc::new(move || flag.store(true, Ordering::SeqCst)),
        );
        Harness {
            transport,
            session,
            invalidated,
            client,
        }
    }

    #[tokio::test]
    async fn request_without_token_carries_no_bearer() {
        let h = harness();
        h.transport.push(200, "{}");

        h.client.send(ApiRequest::get("/task_module/experiment")).await.unwrap();

        let calls = h.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, None);
    }

    #[tokio::test]
    async fn request_with_token_carries_bearer() {
        let h = harness();
        h.session.save("acc-1", "ref-1", "", "", "");
        h.transport.push(200, "{}");

        h.client.send(ApiRequest::get("/task_module/experiment")).await.unwrap();

        assert_eq!(h.transport.calls()[0].1.as_deref(), Some("acc-1"));
    }

    #[tokio::test]
    async fn single_401_is_refreshed_and_replayed_once() {
        let h = harness();
        h.session.save("stale", "ref-1", "", "", "");
        h.transport.push(401, r#"{"detail":"token expired"}"#);
        h.transport.push(200, r#"{"access":"fresh"}"#);
        h.transport.push(200, r#"{"detail":"ok"}"#);

        let resp = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);

        let calls = h.transport.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], ("/task_module/experiment".into(), Some("stale".into())));
        // Exactly one refresh call, without a bearer credential.
        assert_eq!(calls[1], ("/auth/refresh".into(), None));
        // Exactly one replay, carrying the newly issued token.
        assert_eq!(calls[2], ("/task_module/experiment".into(), Some("fresh".into())));
        assert_eq!(h.session.access_token().as_deref(), Some("fresh"));
        assert!(!h.invalidated());
    }

    #[tokio::test]
    async fn missing_refresh_token_propagates_original_401() {
        let h = harness();
        h.session.set_access_token("stale");
        h.transport.push(401, r#"{"detail":"token expired"}"#);

        let err = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status: 401, detail } => {
                assert_eq!(detail.as_deref(), Some("token expired"));
            }
            other => panic!("expected 401 status error, got {:?}", other),
        }
        // The refresh endpoint was never called.
        assert_eq!(h.transport.calls().len(), 1);
        assert!(!h.invalidated());
    }

    #[tokio::test]
    async fn second_401_is_not_retried_again() {
        let h = harness();
        h.session.save("stale", "ref-1", "", "", "");
        h.transport.push(401, "{}");
        h.transport.push(200, r#"{"access":"fresh"}"#);
        h.transport.push(401, r#"{"detail":"still expired"}"#);

        let err = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 401, .. }));
        // One original send, one refresh, one replay; no second replay.
        assert_eq!(h.transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn refresh_failure_fires_invalidation_hook_and_keeps_tokens() {
        let h = harness();
        h.session.save("stale", "bad-refresh", "Ada", "Lovelace", "");
        h.transport.push(401, "{}");
        h.transport.push(401, r#"{"detail":"refresh token invalid"}"#);

        let err = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap_err();

        // The refresh failure, not the original 401, reaches the caller.
        assert_eq!(err.detail_or("?"), "refresh token invalid");
        assert!(h.invalidated());
        // The client clears nothing itself.
        assert_eq!(h.session.access_token().as_deref(), Some("stale"));
        assert_eq!(h.session.refresh_token().as_deref(), Some("bad-refresh"));
        assert_eq!(h.transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn non_auth_errors_pass_through() {
        let h = harness();
        h.session.save("acc", "ref", "", "", "");
        h.transport.push(500, r#"{"detail":"population size out of range"}"#);

        let err = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap_err();

        match err {
            ApiError::Status { status: 500, detail } => {
                assert_eq!(detail.as_deref(), Some("population size out of range"));
            }
            other => panic!("expected 500 status error, got {:?}", other),
        }
        assert_eq!(h.transport.calls().len(), 1);
        assert!(!h.invalidated());
    }

    #[tokio::test]
    async fn unauthenticated_send_skips_bearer_and_refresh() {
        let h = harness();
        // A stale session must not leak into a credential-establishing call.
        h.session.save("stale", "ref-1", "", "", "");
        h.transport.push(401, r#"{"detail":"invalid credentials"}"#);

        let err = h
            .client
            .send_unauthenticated(ApiRequest::post(
                "/auth/login",
                serde_json::json!({ "username": "ada", "password": "wrong" }),
            ))
            .await
            .unwrap_err();

        assert_eq!(err.detail_or("?"), "invalid credentials");
        let calls = h.transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("/auth/login".into(), None));
        assert!(!h.invalidated());
        assert_eq!(h.session.access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn transport_errors_are_not_retried() {
        let h = harness();
        h.transport
            .responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport("connection refused".into())));

        let err = h
            .client
            .send(ApiRequest::get("/task_module/experiment"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(h.transport.calls().len(), 1);
    }

    #[test]
    fn detail_or_falls_back_when_no_detail() {
        let err = ApiError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(err.detail_or("something went wrong"), "something went wrong");

        let err = ApiError::Transport("dns failure".into());
        assert_eq!(err.detail_or("something went wrong"), "something went wrong");
    }

    #[test]
    fn endpoint_builds_query_strings() {
        let transport = HttpTransport::new("http://localhost:8000/api/v1/");
        let req = ApiRequest::get("/task_module/experiment")
            .with_query("page", "2")
            .with_query("search", "rastrigin run");
        let url = transport.endpoint(&req).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/task_module/experiment?page=2&search=rastrigin+run"
        );
    }
}
