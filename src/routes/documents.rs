//! Provider document routes: filtered listing, delete, and upload.
//!
//! An upload writes the file to the storage bucket first and then records
//! its public URL with the backend. If the record fails the object stays in
//! the bucket; the listing is driven by backend records, so it is invisible.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::auth::AuthUser;
use super::error::{ApiError, MSG_STORAGE_DISABLED};
use super::proxy::{SessionToken, fetch_list, relay};
use crate::services::documents::{self, DocumentPage, DocumentQuery};
use crate::services::rbac::Permission;
use crate::services::storage::{ObjectEntry, object_path};
use crate::state::AppState;

const DOCUMENTS: &str = "/provider-documents/";

/// Upload bodies above this are refused before reaching storage.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub provider_id: i64,
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub provider_id: i64,
}

/// `GET /api/documents?field=&q=&page=`
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    Query(query): Query<DocumentQuery>,
) -> Result<Json<DocumentPage>, ApiError> {
    let all = fetch_list(&state, DOCUMENTS, token.as_deref()).await?;
    Ok(Json(documents::list(all, &query)))
}

/// `DELETE /api/documents/{id}`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::DELETE, &format!("{DOCUMENTS}{id}"), Some(&auth.token), None).await
}

/// `POST /api/documents/upload?provider_id=&file_name=` — raw file body.
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    let Some(storage) = &state.storage else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, MSG_STORAGE_DISABLED));
    };
    if body.is_empty() {
        return Err(ApiError::bad_request("El archivo está vacío"));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    let path = object_path(query.provider_id, &query.file_name)?;
    let stored = storage.upload(&path, body.to_vec(), content_type).await?;

    let record = json!({
        "provider_id": query.provider_id,
        "file_name": query.file_name,
        "file_url": stored.public_url,
    });
    let response = relay(&state, Method::POST, DOCUMENTS, Some(&auth.token), Some(&record)).await;
    if response.is_err() {
        tracing::warn!(path = %stored.path, "document stored but backend record failed");
    }
    response
}

/// `GET /api/documents/files?provider_id=` — raw bucket listing for one
/// provider.
pub async fn files(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<FilesQuery>,
) -> Result<Response, ApiError> {
    let Some(storage) = &state.storage else {
        return Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, MSG_STORAGE_DISABLED));
    };
    let entries: Vec<ObjectEntry> = storage.list(&format!("provider-{}/", query.provider_id)).await?;
    Ok(Json(entries).into_response())
}
