//! Budget pocket routes: passthrough plus summary, by-year and allocate.

use axum::extract::{Path, State};
use axum::response::{Json, Response};
use reqwest::Method;
use serde_json::{Value, json};

use super::auth::AuthUser;
use super::error::ApiError;
use super::proxy::{JsonBody, SessionToken, decode, fetch_list, relay};
use crate::services::budget::{
    self, Allocation, AllocationRequest, BudgetPocket, PocketSummary, YearGroup, plan_allocation,
};
use crate::services::rbac::Permission;
use crate::state::AppState;

const POCKETS: &str = "/budget-pockets/";
const EVC_QUARTERS: &str = "/evc-qs/evc_qs/";

fn pocket_path(id: i64) -> String {
    format!("{POCKETS}{id}")
}

fn allocations_path(id: i64) -> String {
    format!("/budget-allocations/pocket/{id}")
}

async fn load_pocket(state: &AppState, id: i64, token: Option<&str>) -> Result<BudgetPocket, ApiError> {
    decode(state.backend.get_json(&pocket_path(id), token).await?)
}

async fn load_allocations(state: &AppState, id: i64, token: Option<&str>) -> Result<Vec<Allocation>, ApiError> {
    let raw = fetch_list(state, &allocations_path(id), token).await?;
    decode(Value::Array(raw))
}

/// `GET /api/budget-pockets`
pub async fn list(State(state): State<AppState>, token: SessionToken) -> Result<Response, ApiError> {
    relay(&state, Method::GET, POCKETS, token.as_deref(), None).await
}

/// `POST /api/budget-pockets`
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::POST, POCKETS, Some(&auth.token), Some(&body)).await
}

/// `GET /api/budget-pockets/{id}`
pub async fn get(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    relay(&state, Method::GET, &pocket_path(id), token.as_deref(), None).await
}

/// `PUT /api/budget-pockets/{id}` — e.g. toggling `is_available`.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Response, ApiError> {
    auth.require(Permission::Modify)?;
    relay(&state, Method::PUT, &pocket_path(id), Some(&auth.token), Some(&body)).await
}

/// `GET /api/budget-pockets/{id}/allocations` — empty when the pocket has none.
pub async fn allocations(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(fetch_list(&state, &allocations_path(id), token.as_deref()).await?))
}

/// `GET /api/budget-pockets/{id}/summary`
pub async fn summary(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<i64>,
) -> Result<Json<PocketSummary>, ApiError> {
    let (pocket, allocations) = tokio::try_join!(
        load_pocket(&state, id, token.as_deref()),
        load_allocations(&state, id, token.as_deref()),
    )?;
    Ok(Json(budget::summarize(pocket, allocations)))
}

/// `GET /api/budget-pockets/by-year`
pub async fn by_year(State(state): State<AppState>, token: SessionToken) -> Result<Json<Vec<YearGroup>>, ApiError> {
    let pockets: Vec<BudgetPocket> = decode(Value::Array(fetch_list(&state, POCKETS, token.as_deref()).await?))?;
    Ok(Json(budget::group_by_year(pockets)))
}

/// `POST /api/budget-pockets/{id}/allocate` — allocate to an EVC, then
/// record the budget on the EVC's quarter.
pub async fn allocate(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(request): JsonBody<AllocationRequest>,
) -> Result<Json<Value>, ApiError> {
    auth.require(Permission::Modify)?;
    let token = Some(auth.token.as_str());

    let (pocket, existing) = tokio::try_join!(load_pocket(&state, id, token), load_allocations(&state, id, token))?;
    let plan = plan_allocation(&pocket, budget::total_allocated(&existing), &request)?;

    let pocket_payload = serde_json::to_value(&plan.pocket).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let allocation = state
        .backend
        .send_json(Method::POST, &format!("{}/allocate", pocket_path(id)), token, Some(&pocket_payload))
        .await?;

    let quarter_payload =
        serde_json::to_value(&plan.evc_quarter).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let evc_quarter = state
        .backend
        .send_json(Method::POST, EVC_QUARTERS, token, Some(&quarter_payload))
        .await
        .inspect_err(|e| {
            tracing::error!(pocket_id = id, error = %e, "allocation stored but EVC quarter update failed");
        })?;

    tracing::info!(pocket_id = id, evc_id = plan.pocket.evc_id, value = plan.pocket.allocated_value, "budget allocated");
    Ok(Json(json!({ "allocation": allocation, "evc_quarter": evc_quarter })))
}
