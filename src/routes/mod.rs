//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the gateway API under `/api`, a health probe, and
//! the page/asset directory as the fallback. The route guard wraps the whole
//! router but only ever acts on page paths.

pub mod auth;
pub mod budget;
pub mod documents;
pub mod error;
pub mod evcs;
pub mod guard;
pub mod notification_rules;
pub mod providers;
pub mod proxy;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Gateway API routes.
fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/validate", get(auth::validate))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/providers", get(providers::list).post(providers::create))
        .route("/api/providers/filter", get(providers::filter))
        .route("/api/providers/bulk", post(providers::bulk))
        .route("/api/providers/{id}", put(providers::update).delete(providers::delete))
        .route("/api/budget-pockets", get(budget::list).post(budget::create))
        .route("/api/budget-pockets/by-year", get(budget::by_year))
        .route("/api/budget-pockets/{id}", get(budget::get).put(budget::update))
        .route("/api/budget-pockets/{id}/allocations", get(budget::allocations))
        .route("/api/budget-pockets/{id}/summary", get(budget::summary))
        .route("/api/budget-pockets/{id}/allocate", post(budget::allocate))
        .route("/api/evcs", get(evcs::list).post(evcs::create))
        .route("/api/evcs/{id}", get(evcs::get).delete(evcs::delete))
        .route("/api/evcs/{id}/providers", get(evcs::providers))
        .route("/api/evc-qs", get(evcs::list_quarters).post(evcs::create_quarter))
        .route("/api/evc-financials", post(evcs::assign_provider))
        .route("/api/technical-leaders", get(evcs::technical_leaders))
        .route("/api/functional-leaders", get(evcs::functional_leaders))
        .route("/api/entornos", get(evcs::entornos))
        .route(
            "/api/notification-rules",
            get(notification_rules::list).post(notification_rules::create),
        )
        .route("/api/notification-rules/bulk", post(notification_rules::bulk))
        .route(
            "/api/notification-rules/{id}",
            patch(notification_rules::update).delete(notification_rules::delete),
        )
        .route("/api/documents", get(documents::list))
        .route("/api/documents/files", get(documents::files))
        .route(
            "/api/documents/upload",
            post(documents::upload).layer(DefaultBodyLimit::max(documents::MAX_UPLOAD_BYTES)),
        )
        .route("/api/documents/{id}", delete(documents::delete))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full gateway: API, then pages and assets from `STATIC_DIR`, all behind the
/// route guard.
pub fn app(state: AppState) -> Router {
    let pages = ServeDir::new(&state.config.static_dir).append_index_html_on_directories(true);

    api_routes(state)
        .fallback_service(pages)
        .layer(axum::middleware::from_fn(guard::guard_pages))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
