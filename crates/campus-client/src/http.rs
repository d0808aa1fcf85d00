//! # HTTP Client
//!
//! Thin wrapper over `reqwest` that every endpoint goes through.
//!
//! ## Request / Response Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         ApiClient::send                                 │
//! │                                                                         │
//! │  path ──► base_url + path ──► + Authorization: Bearer <token>          │
//! │                                 (only when a token is present)          │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                   HTTP response                         │
//! │                 ┌────────────────────────┼─────────────────────────┐    │
//! │                 ▼                        ▼                         ▼    │
//! │           2xx JSON type             2xx other              non-2xx      │
//! │           ApiBody::Json             ApiBody::Text          │            │
//! │           (unparseable → Text)                             │            │
//! │                                           401 + token sent? ┤           │
//! │                                     yes: reject token,      │ no        │
//! │                                     SessionExpired          ▼           │
//! │                                            body.message │ body.errors │ │
//! │                                            status text → Api error     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Source of the bearer token attached to outgoing requests.
///
/// Implemented by the session; the client never owns the token itself.
pub trait AuthProvider: Send + Sync {
    /// The current token, if logged in.
    fn bearer(&self) -> Option<String>;

    /// Called when the server answered 401 to a request carrying `token`.
    fn reject(&self, token: &str);
}

/// A decoded 2xx body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
}

impl ApiBody {
    /// Deserializes the body; a text body is tried as JSON before giving up.
    pub fn into_json<T: DeserializeOwned>(self) -> ClientResult<T> {
        match self {
            ApiBody::Json(value) => Ok(serde_json::from_value(value)?),
            ApiBody::Text(text) => serde_json::from_str(&text).map_err(|_| {
                ClientError::Decode(format!("expected JSON, got text: {}", preview(&text)))
            }),
        }
    }

    /// The body as text; JSON bodies are rendered compactly.
    pub fn into_text(self) -> String {
        match self {
            ApiBody::Json(Value::String(s)) => s,
            ApiBody::Json(value) => value.to_string(),
            ApiBody::Text(text) => text,
        }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthMode {
    Bearer,
    Anonymous,
}

/// REST client bound to one base URL.
///
/// Cheap to clone; clones share the connection pool and token source.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    auth: Option<Arc<dyn AuthProvider>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_auth", &self.auth.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Builds a client from a validated config.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(ApiClient {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            http,
            auth: None,
        })
    }

    /// Attaches the token source.
    pub fn with_auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    pub async fn get(&self, path: &str) -> ClientResult<ApiBody> {
        let response = self
            .send::<()>(Method::GET, path, None, AuthMode::Bearer)
            .await?;
        read_body(response).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ApiBody> {
        let response = self
            .send(Method::POST, path, Some(body), AuthMode::Bearer)
            .await?;
        read_body(response).await
    }

    /// POST without a request body.
    pub async fn post_empty(&self, path: &str) -> ClientResult<ApiBody> {
        let response = self
            .send::<()>(Method::POST, path, None, AuthMode::Bearer)
            .await?;
        read_body(response).await
    }

    /// POST that never carries a token, for credential exchange.
    pub async fn post_anonymous<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiBody> {
        let response = self
            .send(Method::POST, path, Some(body), AuthMode::Anonymous)
            .await?;
        read_body(response).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ApiBody> {
        let response = self
            .send(Method::PUT, path, Some(body), AuthMode::Bearer)
            .await?;
        read_body(response).await
    }

    /// DELETE signals success only; any body is discarded.
    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send::<()>(Method::DELETE, path, None, AuthMode::Bearer)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get(path).await?.into_json()
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(path, body).await?.into_json()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn url(&self, path: &str) -> ClientResult<String> {
        let url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        url::Url::parse(&url)?;
        Ok(url)
    }

    /// Sends the request and turns every non-2xx into a `ClientError`.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mode: AuthMode,
    ) -> ClientResult<Response> {
        let url = self.url(path)?;
        let token = match mode {
            AuthMode::Bearer => self.auth.as_ref().and_then(|a| a.bearer()),
            AuthMode::Anonymous => None,
        };

        let mut request = self.http.request(method.clone(), &url);
        if let Some(ref token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, path, authenticated = token.is_some(), "Sending request");
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            if let (Some(token), Some(auth)) = (token.as_deref(), self.auth.as_ref()) {
                warn!(method = %method, path, "Token rejected by server, ending session");
                auth.reject(token);
                return Err(ClientError::SessionExpired);
            }
        }

        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text).unwrap_or_else(|| status_text(status));
        warn!(method = %method, path, status = status.as_u16(), message = %message, "Request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Reads a 2xx body according to its content type.
async fn read_body(response: Response) -> ClientResult<ApiBody> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    let text = response.text().await?;
    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            return Ok(ApiBody::Json(value));
        }
        debug!(body = %preview(&text), "JSON content type with unparseable body, keeping text");
    }
    Ok(ApiBody::Text(text))
}

/// Extracts a display message from an error body: `message`, then `errors`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    if let Some(message) = object.get("message").and_then(non_empty_text) {
        return Some(message);
    }
    object.get("errors").and_then(non_empty_text)
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
