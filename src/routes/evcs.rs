//! EVC routes: EVCs, their quarters, provider assignments, and the lookup
//! lists the EVC form needs.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};
use reqwest::Method;
use serde_json::Value;

use super::auth::AuthUser;
use super::error::ApiError;
use super::proxy::{JsonBody, SessionToken, fetch_list, relay};
use crate::services::evcs::{self, EvcQuery, FinancialRequest, plan_financial};
use crate::services::rbac::Permission;
use crate::state::AppState;

const EVCS: &str = "/evcs/evcs/";
const EVC_QUARTERS: &str = "/evc-qs/evc_qs/";
const EVC_FINANCIALS: &str = "/evc-financials/evc_financials/";
const TECHNICAL_LEADERS: &str = "/technical-leaders/technical-leaders/";
const FUNCTIONAL_LEADERS: &str = "/functional-leaders/functional-leaders";
const ENTORNOS: &str = "/entornos/entornos/";

fn evc_path(id: i64) -> String {
    format!("{EVCS}{id}")
}

/// `GET /api/evcs?entorno_id=` — passthrough, or filtered here when an
/// entorno is given.
pub async fn list(
    State(state): State<AppState>,
    token: SessionToken,
    Query(query): Query<EvcQuery>,
) -> Result<Response, ApiError> {
    let Some(entorno_id) = query.entorno()? else {
        return relay(&state, Method::GET, EVCS, token.as_deref(), None).await;
    };
    let all = fetch_list(&state, EVCS, token.as_deref()).await?;
    Ok(Json(evcs::filter_by_entorno(all, entorno_id)).into_response())
}

/// `POST /api/evcs`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::POST, EVCS, Some(&auth.token), Some(&body)).await
}

/// `GET /api/evcs/{id}` — the EVC with its quarters and assignments.
pub async fn get(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    relay(&state, Method::GET, &evc_path(id), token.as_deref(), None).await
}

/// `DELETE /api/evcs/{id}`
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::DELETE, &evc_path(id), Some(&auth.token), None).await
}

/// `GET /api/evcs/{id}/providers`
pub async fn providers(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let evc = state.backend.get_json(&evc_path(id), token.as_deref()).await?;
    Ok(Json(evcs::evc_providers(&evc)))
}

/// `GET /api/evc-qs`
pub async fn list_quarters(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, EVC_QUARTERS, token.as_deref(), None).await
}

/// `POST /api/evc-qs`
pub async fn create_quarter(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::POST, EVC_QUARTERS, Some(&auth.token), Some(&body)).await
}

/// `POST /api/evc-financials` — assign a provider to an EVC quarter.
pub async fn assign_provider(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<FinancialRequest>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    let payload = plan_financial(&request)?;
    let body = serde_json::to_value(&payload).map_err(|e| ApiError::bad_request(e.to_string()))?;
    tracing::info!(evc_q_id = payload.evc_q_id, provider_id = payload.provider_id, "assigning provider");
    relay(&state, Method::POST, EVC_FINANCIALS, Some(&auth.token), Some(&body)).await
}

/// `GET /api/technical-leaders`
pub async fn technical_leaders(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, TECHNICAL_LEADERS, token.as_deref(), None).await
}

/// `GET /api/functional-leaders`
pub async fn functional_leaders(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, FUNCTIONAL_LEADERS, token.as_deref(), None).await
}

/// `GET /api/entornos`
pub async fn entornos(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, ENTORNOS, token.as_deref(), None).await
}
