//! Object storage for provider documents (Supabase Storage REST API).
//!
//! ARCHITECTURE
//! ============
//! Uploads go straight to the bucket with the project's anon key; the
//! resulting public URL is what the backend stores in the document record.
//! Objects live under `provider-{id}/` with a random prefix so two uploads
//! of the same file name never collide.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BackendTimeouts, StorageConfig};

const LIST_LIMIT: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Transport(String),

    #[error("storage returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("storage response parse failed: {0}")]
    Parse(String),

    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// An uploaded object and where browsers can fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: String,
    pub public_url: String,
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
///
/// # Errors
///
/// `InvalidFileName` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Result<String, StorageError> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    let clean: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if clean.trim_matches('.').is_empty() {
        return Err(StorageError::InvalidFileName(raw.to_string()));
    }
    Ok(clean)
}

/// `provider-{id}/{uuid}-{file}`.
///
/// # Errors
///
/// `InvalidFileName` when the name sanitizes to nothing.
pub fn object_path(provider_id: i64, file_name: &str) -> Result<String, StorageError> {
    let file = sanitize_file_name(file_name)?;
    Ok(format!("provider-{provider_id}/{}-{file}", uuid::Uuid::new_v4()))
}

#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl StorageClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &StorageConfig, timeouts: BackendTimeouts) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| StorageError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            bucket: config.bucket.clone(),
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{path}", self.base_url, self.bucket)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.api_key).header("apikey", &self.api_key)
    }

    /// Upload `bytes` to `path`. Existing objects are not overwritten.
    ///
    /// # Errors
    ///
    /// Transport failure or a non-2xx answer from storage.
    pub async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError> {
        let url = format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket);
        let request = self
            .authorized(self.http.post(url))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        let response = request.send().await.map_err(|e| {
            tracing::error!(path, error = %e, "storage upload failed");
            StorageError::Transport(e.to_string())
        })?;
        read_success(response).await?;

        tracing::info!(path, bucket = %self.bucket, "document stored");
        Ok(StoredObject { path: path.to_string(), public_url: self.public_url(path) })
    }

    /// List objects under `prefix`, newest first.
    ///
    /// # Errors
    ///
    /// Transport failure, non-2xx, or an undecodable listing.
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let url = format!("{}/storage/v1/object/list/{}", self.base_url, self.bucket);
        let response = self
            .authorized(self.http.post(url))
            .json(&serde_json::json!({
                "prefix": prefix,
                "limit": LIST_LIMIT,
                "offset": 0,
                "sortBy": {"column": "created_at", "order": "desc"},
            }))
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        let text = read_success(response).await?;
        serde_json::from_str(&text).map_err(|e| StorageError::Parse(e.to_string()))
    }
}

async fn read_success(response: reqwest::Response) -> Result<String, StorageError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| StorageError::Transport(e.to_string()))?;
    if !status.is_success() {
        return Err(StorageError::Api { status: status.as_u16(), message: storage_message(&text) });
    }
    Ok(text)
}

/// Storage errors carry `message` (sometimes `error`); fall back to the body.
fn storage_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .or_else(|| json.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
