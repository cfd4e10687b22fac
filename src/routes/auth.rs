//! Auth routes — login, register, validate, logout, and the user extractor.
//!
//! Each handler builds its own `AuthSession` over the request's cookie jar,
//! drives it, and hands the jar back so cookie changes reach the response.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};

use super::error::ApiError;
use super::proxy::JsonBody;
use crate::services::auth_session::{AuthSession, AuthState, DASHBOARD_PATH, LOGIN_PATH};
use crate::services::backend::BackendError;
use crate::services::forms::{LoginForm, RegisterForm};
use crate::services::rbac::{Capabilities, Permission};
use crate::services::session::{CookieTokenStore, TokenStore, User, token_from_jar};
use crate::state::AppState;

pub const MSG_NO_TOKEN: &str = "No token provided";
pub const MSG_INVALID_TOKEN: &str = "Invalid token";
pub const MSG_LOGGED_OUT: &str = "Logged out successfully";

fn session_for(state: &AppState, jar: CookieJar) -> AuthSession<CookieTokenStore> {
    AuthSession::new(state.auth.clone(), CookieTokenStore::new(jar, state.cookie_secure()))
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the session cookie by asking the backend.
/// Use as a handler parameter to require a valid session.
pub struct AuthUser {
    pub user: User,
    pub token: String,
    pub capabilities: Capabilities,
}

impl AuthUser {
    /// # Errors
    ///
    /// `403` when the user's role does not grant `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.capabilities.allows(permission) {
            Ok(())
        } else {
            tracing::info!(user_id = %self.user.id, ?permission, "permission denied");
            Err(ApiError::forbidden())
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = token_from_jar(&jar) else {
            return Err(ApiError::unauthorized(MSG_NO_TOKEN));
        };

        let app_state = AppState::from_ref(state);
        let user = app_state.auth.validate_token(&token).await.map_err(|e| match e {
            BackendError::Api { detail, .. } => ApiError::unauthorized(detail.unwrap_or_else(|| MSG_INVALID_TOKEN.into())),
            other => ApiError::from(other),
        })?;

        let capabilities = Capabilities::for_user(Some(&user));
        Ok(Self { user, token, capabilities })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Success body shared by login and register.
fn issued_body(session: &AuthSession<CookieTokenStore>, user: &User) -> Value {
    json!({
        "access_token": session.store().token().unwrap_or_default(),
        "user": user,
        "redirect": session.navigation().unwrap_or(DASHBOARD_PATH),
    })
}

/// `POST /api/auth/login` — exchange credentials, set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(form): JsonBody<LoginForm>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let mut session = session_for(&state, jar);
    let user = session.login(&form).await?;
    let body = issued_body(&session, &user);
    Ok((session.into_store().into_jar(), Json(body)))
}

/// `POST /api/auth/register` — create the account, set the session cookie.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let mut session = session_for(&state, jar);
    let user = session.register(&form).await?;
    let body = issued_body(&session, &user);
    Ok((session.into_store().into_jar(), Json(body)))
}

/// `GET /api/auth/validate` — resolve the cookie into a user. A rejected
/// token is dropped from the browser.
pub async fn validate(State(state): State<AppState>, jar: CookieJar) -> Response {
    let had_token = token_from_jar(&jar).is_some();
    let mut session = session_for(&state, jar);

    let user = match session.initialize().await {
        AuthState::Authenticated(user) => Some(user.clone()),
        AuthState::Unknown | AuthState::Anonymous => None,
    };
    let jar = session.into_store().into_jar();

    match user {
        Some(user) => (jar, Json(user)).into_response(),
        None if had_token => (jar, ApiError::unauthorized(MSG_INVALID_TOKEN)).into_response(),
        None => ApiError::unauthorized(MSG_NO_TOKEN).into_response(),
    }
}

/// `GET /api/auth/me` — current user and what they may do.
pub async fn me(auth: AuthUser) -> Json<Value> {
    Json(json!({ "user": auth.user, "capabilities": auth.capabilities }))
}

/// `POST /api/auth/logout` — clear the cookie. Never calls the backend.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let mut session = session_for(&state, jar);
    session.logout();
    let redirect = session.navigation().unwrap_or(LOGIN_PATH);
    let jar = session.into_store().into_jar();
    (StatusCode::OK, jar, Json(json!({ "message": MSG_LOGGED_OUT, "redirect": redirect })))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
