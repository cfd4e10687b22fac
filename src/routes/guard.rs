//! Route guard for page navigation.
//!
//! Runs before any page is served. Only the presence of the session cookie
//! is checked here; whether the token is still valid is decided by
//! `/api/auth/validate`, which clears a stale cookie.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::services::auth_session::{DASHBOARD_PATH, LOGIN_PATH};
use crate::services::session::token_from_jar;

/// Pages only anonymous visitors should see.
pub const AUTH_PAGES: [&str; 2] = ["/login", "/register"];

/// Pages that need a session, along with everything below them.
pub const PROTECTED_PAGES: [&str; 7] = [
    "/dashboard",
    "/profile",
    "/proveedores",
    "/documentos",
    "/evcs",
    "/asignacion-presupuestal",
    "/configuracion",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(&'static str),
}

/// `path` equals `prefix` or continues it with a new segment.
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn evaluate(path: &str, has_token: bool) -> GuardDecision {
    if has_token && AUTH_PAGES.iter().any(|p| under(path, p)) {
        return GuardDecision::Redirect(DASHBOARD_PATH);
    }
    if !has_token && PROTECTED_PAGES.iter().any(|p| under(path, p)) {
        return GuardDecision::Redirect(LOGIN_PATH);
    }
    GuardDecision::Pass
}

/// Middleware: answer `303 See Other` when `evaluate` says so.
pub async fn guard_pages(jar: CookieJar, req: Request<Body>, next: Next) -> Response {
    let has_token = token_from_jar(&jar).is_some();
    match evaluate(req.uri().path(), has_token) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!(path = %req.uri().path(), to, "guard redirect");
            Redirect::to(to).into_response()
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
