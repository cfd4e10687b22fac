//! Notification rule routes. Configuration is admin-only, reads included.

use axum::extract::{Path, State};
use axum::response::Response;
use reqwest::Method;
use serde_json::Value;

use super::auth::AuthUser;
use super::error::ApiError;
use super::proxy::{JsonBody, relay};
use crate::services::notification_rules::{validate_bulk, validate_patch, validate_rule};
use crate::services::rbac::Permission;
use crate::state::AppState;

const RULES: &str = "/notification-rules/notification-rules/";

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// `GET /api/notification-rules`
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> Result<Response, ApiError> {
    auth.require(Permission::AccessConfig)?;
    relay(&state, Method::GET, RULES, Some(&auth.token), None).await
}

/// `POST /api/notification-rules`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::AccessConfig)?;
    let rule = encode(&validate_rule(&body)?)?;
    relay(&state, Method::POST, RULES, Some(&auth.token), Some(&rule)).await
}

/// `PATCH /api/notification-rules/{id}` — partial update, e.g. `{active}`.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::AccessConfig)?;
    validate_patch(&body)?;
    relay(&state, Method::PATCH, &format!("{RULES}{id}"), Some(&auth.token), Some(&body)).await
}

/// `DELETE /api/notification-rules/{id}`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    auth.require(Permission::AccessConfig)?;
    relay(&state, Method::DELETE, &format!("{RULES}{id}"), Some(&auth.token), None).await
}

/// `POST /api/notification-rules/bulk`
pub async fn bulk(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::AccessConfig)?;
    let rules = encode(&validate_bulk(&body)?)?;
    relay(&state, Method::POST, &format!("{RULES}bulk"), Some(&auth.token), Some(&rules)).await
}
