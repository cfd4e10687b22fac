//! Provider routes.

use axum::extract::{Path, Query, State};
use axum::response::{Json, Response};
use reqwest::Method;
use serde_json::Value;

use super::auth::AuthUser;
use super::error::ApiError;
use super::proxy::{JsonBody, SessionToken, fetch_list, relay};
use crate::services::providers::{ProviderFilter, normalize_bulk};
use crate::services::rbac::Permission;
use crate::state::AppState;

const PROVIDERS: &str = "/providers/providers/";
const PROVIDERS_BULK: &str = "/providers/providers/bulk-upload";

/// `GET /api/providers`
pub async fn list(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, PROVIDERS, token.as_deref(), None).await
}

/// `POST /api/providers`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::POST, PROVIDERS, Some(&auth.token), Some(&body)).await
}

/// `GET /api/providers/filter` — full list, filtered here.
pub async fn filter(
    State(state): State<AppState>,
    token: SessionToken,
    Query(filter): Query<ProviderFilter>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let providers = fetch_list(&state, PROVIDERS, token.as_deref()).await?;
    Ok(Json(filter.apply(providers)))
}

/// `PUT /api/providers/{id}` — inline edit of one provider.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::PUT, &format!("{PROVIDERS}{id}"), Some(&auth.token), Some(&body)).await
}

/// `DELETE /api/providers/{id}`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::DELETE, &format!("{PROVIDERS}{id}"), Some(&auth.token), None).await
}

/// `POST /api/providers/bulk` — records or spreadsheet rows.
pub async fn bulk(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(rows): JsonBody<Vec<Value>>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    let providers = normalize_bulk(rows)?;
    tracing::info!(count = providers.len(), "bulk provider upload");
    relay(&state, Method::POST, PROVIDERS_BULK, Some(&auth.token), Some(&Value::Array(providers))).await
}
