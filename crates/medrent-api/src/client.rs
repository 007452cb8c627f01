// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Medrent REST backend.
//!
//! [`ApiClient`] builds requests against the configured base URL, attaches
//! the session's bearer token, enforces the request timeout, and maps
//! non-2xx responses onto [`MedrentError`]. 401 handling lives in
//! [`crate::refresh`].

use std::sync::Arc;
use std::time::Duration;

use medrent_config::model::ApiConfig;
use medrent_core::{FieldErrors, MedrentError};
use medrent_session::SessionStore;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::redact::{SecretRegistry, redact};

/// Longest excerpt of a non-JSON error body kept in an error message.
const MAX_ERROR_EXCERPT: usize = 200;

/// A request that can be sent, and replayed once after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) authenticated: bool,
    pub(crate) retried: bool,
}

impl ApiRequest {
    /// `path` is relative to the API base URL, e.g. `/accounts/me/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn queries<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a JSON body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, MedrentError> {
        let value = serde_json::to_value(body)
            .map_err(|e| MedrentError::Internal(format!("failed to encode request body: {e}")))?;
        Ok(self.body(value))
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sends without a bearer token and without 401 renewal.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True for the single replay issued after a token refresh.
    pub fn is_retry(&self) -> bool {
        self.retried
    }
}

/// A buffered backend response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Decodes the body as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, MedrentError> {
        serde_json::from_slice(&self.body).map_err(|e| MedrentError::Network {
            message: format!("malformed response body: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Decodes the body as JSON, treating an empty body as `null`.
    pub fn json_value(&self) -> Result<Value, MedrentError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        self.json()
    }
}

/// Authenticated client for the REST backend.
///
/// Cheap to clone; all clones share one connection pool, one session, and
/// one refresh gate.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
    pub(crate) session: Arc<SessionStore>,
    pub(crate) secrets: SecretRegistry,
    /// Held for the whole duration of a token refresh.
    pub(crate) refresh_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl ApiClient {
    /// Creates a client over `session` with a private secret registry.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, MedrentError> {
        Self::with_secrets(config, session, SecretRegistry::new())
    }

    /// Creates a client that records every token it sends in `secrets`, so
    /// a [`RedactingWriter`](crate::redact::RedactingWriter) sharing the
    /// registry can mask them.
    pub fn with_secrets(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        secrets: SecretRegistry,
    ) -> Result<Self, MedrentError> {
        Url::parse(&config.base_url).map_err(|e| {
            MedrentError::Config(format!("invalid api.base_url `{}`: {e}", config.base_url))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .build()
            .map_err(|e| MedrentError::Network {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                timeout,
                session,
                secrets,
                refresh_gate: tokio::sync::Mutex::new(()),
            }),
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn secrets(&self) -> &SecretRegistry {
        &self.inner.secrets
    }

    /// Sends a request, renewing the access token once on 401.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, MedrentError> {
        self.execute(request).await
    }

    /// Like [`ApiClient::send`], but gives up with
    /// [`MedrentError::Cancelled`] as soon as `cancel` fires.
    pub async fn send_cancellable(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, MedrentError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(path = %request.path, "request cancelled");
                Err(MedrentError::Cancelled)
            }
            result = self.execute(request.clone()) => result,
        }
    }

    /// One attempt with an explicit token: the session is neither read nor
    /// touched, and a 401 is returned as-is.
    pub async fn send_with_token(
        &self,
        request: ApiRequest,
        token: &SecretString,
    ) -> Result<ApiResponse, MedrentError> {
        let response = self.attempt(&request, Some(token)).await?;
        self.finish(&request, response)
    }

    /// Sends a request and decodes the JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, MedrentError> {
        self.send(request).await?.json()
    }

    /// Sends a request whose response body is not needed.
    pub async fn send_unit(&self, request: ApiRequest) -> Result<(), MedrentError> {
        self.send(request).await.map(|_| ())
    }

    pub(crate) fn url(&self, request: &ApiRequest) -> Result<Url, MedrentError> {
        let separator = if request.path.starts_with('/') { "" } else { "/" };
        let raw = format!("{}{separator}{}", self.inner.base_url, request.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| MedrentError::Internal(format!("invalid request URL `{raw}`: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// One round trip with the given token. Never inspects the status.
    pub(crate) async fn attempt(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
    ) -> Result<ApiResponse, MedrentError> {
        let url = self.url(request)?;
        let request_id = Uuid::new_v4();

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .header("X-Request-Id", request_id.to_string());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            self.inner.secrets.add(token.expose_secret());
            builder = builder.bearer_auth(token.expose_secret());
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?
            .to_vec();

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            request_id = %request_id,
            retried = request.retried,
            "api response"
        );
        Ok(ApiResponse { status, body })
    }

    /// Passes 2xx responses through and maps everything else to an error.
    pub(crate) fn finish(
        &self,
        request: &ApiRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, MedrentError> {
        if response.status.is_success() {
            return Ok(response);
        }
        Err(error_for_status(
            response.status,
            &response.body,
            &request.path,
            &self.inner.secrets.snapshot(),
        ))
    }

    fn transport_error(&self, e: reqwest::Error) -> MedrentError {
        if e.is_timeout() {
            MedrentError::Timeout {
                duration: self.inner.timeout,
            }
        } else {
            MedrentError::Network {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

/// Maps a non-2xx status and its body onto the error taxonomy.
pub(crate) fn error_for_status(
    status: StatusCode,
    body: &[u8],
    path: &str,
    known_secrets: &[String],
) -> MedrentError {
    let (message, fields) = parse_error_body(body);
    let message = redact(&message, known_secrets);
    let or = |fallback: &str| {
        if message.is_empty() {
            fallback.to_string()
        } else {
            message.clone()
        }
    };

    match status.as_u16() {
        401 => MedrentError::Unauthorized(or("authentication required")),
        403 => MedrentError::PermissionDenied(or("permission denied")),
        404 => MedrentError::NotFound(or(path)),
        code if code >= 500 => MedrentError::Server {
            status: code,
            message: or(status.canonical_reason().unwrap_or("server error")),
        },
        _ => MedrentError::Validation {
            message: or(&format!("request rejected with status {status}")),
            fields,
        },
    }
}

/// Reads a DRF-style error body: `{"detail": "..."}` or
/// `{"field": ["msg", ...], ...}`. Anything else becomes a short excerpt.
pub(crate) fn parse_error_body(body: &[u8]) -> (String, FieldErrors) {
    let mut fields = FieldErrors::new();
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => {
            let mut detail = None;
            for (key, value) in map {
                let messages = flatten_messages(&value);
                if key == "detail" || key == "message" {
                    detail = Some(messages.join(" "));
                } else {
                    fields.insert(key, messages);
                }
            }
            let message = detail.unwrap_or_else(|| {
                fields
                    .iter()
                    .map(|(field, msgs)| format!("{field}: {}", msgs.join(" ")))
                    .collect::<Vec<_>>()
                    .join("; ")
            });
            (message, fields)
        }
        Ok(value @ (Value::Array(_) | Value::String(_))) => {
            (flatten_messages(&value).join(" "), fields)
        }
        _ => {
            let text = String::from_utf8_lossy(body);
            (text.trim().chars().take(MAX_ERROR_EXCERPT).collect(), fields)
        }
    }
}

fn flatten_messages(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items.iter().flat_map(flatten_messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrent_session::MemoryTokenStore;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, timeout_secs: u64) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs,
            ..ApiConfig::default()
        }
    }

    fn test_client(base_url: &str) -> ApiClient {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
        ApiClient::new(&config(base_url, 5), session).unwrap()
    }

    #[test]
    fn drf_field_errors_are_collected() {
        let body = br#"{"email": ["This field is required."], "password": ["Too short.", "Too common."]}"#;
        let (message, fields) = parse_error_body(body);
        assert_eq!(fields["password"].len(), 2);
        assert_eq!(
            message,
            "email: This field is required.; password: Too short. Too common."
        );
    }

    #[test]
    fn drf_detail_becomes_message() {
        let (message, fields) = parse_error_body(br#"{"detail": "Not found."}"#);
        assert_eq!(message, "Not found.");
        assert!(fields.is_empty());
    }

    #[test]
    fn non_json_body_is_truncated() {
        let body = "x".repeat(1000);
        let (message, _) = parse_error_body(body.as_bytes());
        assert_eq!(message.len(), MAX_ERROR_EXCERPT);
    }

    #[test]
    fn status_mapping() {
        let map = |code: u16| {
            error_for_status(StatusCode::from_u16(code).unwrap(), b"", "/x/", &[])
        };
        assert!(matches!(map(400), MedrentError::Validation { .. }));
        assert!(matches!(map(401), MedrentError::Unauthorized(_)));
        assert!(matches!(map(403), MedrentError::PermissionDenied(_)));
        assert!(matches!(map(404), MedrentError::NotFound(ref p) if p == "/x/"));
        assert!(matches!(map(503), MedrentError::Server { status: 503, .. }));
    }

    #[test]
    fn error_messages_are_redacted() {
        let body = br#"{"detail": "bad token eyJhbGciOiJIUzI1NiJ9.eyJ1IjoxfQ.sig"}"#;
        let err = error_for_status(StatusCode::UNAUTHORIZED, body, "/", &[]);
        assert!(!err.to_string().contains("eyJhbGci"));
    }

    #[test]
    fn url_joins_base_path_and_query() {
        let client = test_client("http://localhost:8000/api/");
        let url = client
            .url(&ApiRequest::get("/orders/orders/").query("status", "pending"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/orders/orders/?status=pending"
        );
    }

    #[tokio::test]
    async fn anonymous_request_has_no_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping/"))
            .and(header("accept", "application/json"))
            .and(header_exists("x-request-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client
            .send(ApiRequest::get("/ping/").anonymous())
            .await
            .unwrap();
        let received = &server.received_requests().await.unwrap()[0];
        assert!(received.headers.get("authorization").is_none());
        assert_eq!(response.json_value().unwrap()["ok"], true);
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts/me/"))
            .and(header("authorization", "Bearer acc-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client
            .session()
            .establish(
                medrent_core::TokenPair::new("acc-1", Some("ref-1".into())),
                medrent_core::UserIdentity {
                    id: 1,
                    email: "a@b.c".into(),
                    first_name: String::new(),
                    last_name: String::new(),
                    role: medrent_core::Role::Staff,
                    phone_number: None,
                    address: None,
                },
            )
            .await
            .unwrap();

        client.send(ApiRequest::get("/accounts/me/")).await.unwrap();
        assert_eq!(client.secrets().snapshot(), vec!["acc-1".to_string()]);
    }

    #[tokio::test]
    async fn query_and_body_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reports/reports/generate/"))
            .and(query_param("format", "pdf"))
            .and(wiremock::matchers::body_json(serde_json::json!({"report_type": "sales"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let created: Value = client
            .send_json(
                ApiRequest::post("/reports/reports/generate/")
                    .query("format", "pdf")
                    .json(&serde_json::json!({"report_type": "sales"}))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created["id"], 3);
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
        let client = ApiClient::new(&config(&server.uri(), 1), session).unwrap();
        let err = client
            .send(ApiRequest::get("/slow/").anonymous())
            .await
            .unwrap_err();
        assert!(matches!(err, MedrentError::Timeout { duration } if duration == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow/"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = client
            .send_cancellable(ApiRequest::get("/slow/"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, MedrentError::Cancelled));
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Port 9 (discard) is not listening in test environments.
        let client = test_client("http://127.0.0.1:9");
        let err = client
            .send(ApiRequest::get("/x/").anonymous())
            .await
            .unwrap_err();
        assert!(err.is_transport(), "got: {err:?}");
    }

    #[tokio::test]
    async fn empty_body_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/clients/clients/4/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client
            .send(ApiRequest::delete("/clients/clients/4/").anonymous())
            .await
            .unwrap();
        assert_eq!(response.json_value().unwrap(), Value::Null);
    }
}
