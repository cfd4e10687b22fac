//! Backend HTTP client — auth endpoints plus the JSON CRUD passthrough.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` per process, cloned into handlers. Auth calls go
//! through the `AuthApi` trait so the auth session can be tested against a
//! mock. CRUD calls are untyped JSON; routes only decode what they aggregate.
//! Pure parsing lives in free functions for testability.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::session::User;
use crate::config::BackendTimeouts;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request never got a response (connect, timeout, reset).
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Api { status: u16, detail: Option<String> },

    /// A success body could not be decoded.
    #[error("backend response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl BackendError {
    /// HTTP status the backend returned, if it returned one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message supplied by the backend, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// Pull the most useful message out of a backend error body.
///
/// Order: `detail` string, first `msg` of a `detail` array of field errors,
/// then `message`.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match json.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            if let Some(msg) = items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }
    json.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

// =============================================================================
// AUTH API
// =============================================================================

/// A token issued by the backend together with the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub user: User,
}

/// Outbound auth calls against the backend.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a token. `email` is sent as `username`.
    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, BackendError>;

    /// Create an account and return a token for it.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<IssuedToken, BackendError>;

    /// Resolve the user a token belongs to. Any non-2xx means invalid.
    async fn validate_token(&self, token: &str) -> Result<User, BackendError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    user: Option<User>,
}

fn parse_login_response(body: &str) -> Result<(String, Option<User>), BackendError> {
    let parsed: LoginResponse = serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(BackendError::Parse("empty access_token".into()));
    }
    Ok((parsed.access_token, parsed.user))
}

/// Register answers with the user triple at the top level, token optional.
fn parse_register_response(body: &str) -> Result<(Option<String>, User), BackendError> {
    let json: Value = serde_json::from_str(body).map_err(|e| BackendError::Parse(e.to_string()))?;
    let token = json
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let user: User = serde_json::from_value(json).map_err(|e| BackendError::Parse(e.to_string()))?;
    Ok((token, user))
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeouts: BackendTimeouts) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET path`, decoding the JSON body.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx, or undecodable body.
    pub async fn get_json(&self, path: &str, token: Option<&str>) -> Result<Value, BackendError> {
        self.send_json(Method::GET, path, token, None).await
    }

    /// Send `method path` with an optional JSON body and bearer token.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx, or undecodable body.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let (_, value) = self.forward(method, path, token, body).await?;
        Ok(value)
    }

    /// Like [`BackendClient::send_json`], keeping the success status so a
    /// proxy can relay `201` and friends.
    ///
    /// # Errors
    ///
    /// Transport, non-2xx, or undecodable body.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value), BackendError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, path, error = %e, "backend request failed");
            BackendError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = read_success(response).await?;
        Ok((status, parse_json_body(&text)?))
    }

    async fn post_form_login(&self, email: &str, password: &str) -> Result<(String, Option<User>), BackendError> {
        let response = self
            .http
            .post(self.url("/auth/token"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let text = read_success(response).await?;
        parse_login_response(&text)
    }
}

/// Read the body of a response, turning non-2xx into `BackendError::Api`.
async fn read_success(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(BackendError::Api { status: status.as_u16(), detail: extract_error_message(&text) });
    }
    Ok(text)
}

/// Empty bodies (204, bare DELETE) decode as `null`.
fn parse_json_body(text: &str) -> Result<Value, BackendError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| BackendError::Parse(e.to_string()))
}

#[async_trait::async_trait]
impl AuthApi for BackendClient {
    async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, BackendError> {
        let (token, user) = self.post_form_login(email, password).await?;
        let user = match user {
            Some(user) => user,
            None => self.validate_token(&token).await?,
        };
        Ok(IssuedToken { token, user })
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<IssuedToken, BackendError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "username": name,
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let text = read_success(response).await?;
        let (token, user) = parse_register_response(&text)?;
        match token {
            Some(token) => Ok(IssuedToken { token, user }),
            None => {
                tracing::debug!(user_id = %user.id, "register returned no token; logging in");
                let (token, _) = self.post_form_login(email, password).await?;
                Ok(IssuedToken { token, user })
            }
        }
    }

    async fn validate_token(&self, token: &str) -> Result<User, BackendError> {
        let response = self
            .http
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let text = read_success(response).await?;
        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
