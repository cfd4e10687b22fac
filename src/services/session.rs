//! Session storage — the `auth_token` cookie and the user record it unlocks.
//!
//! ARCHITECTURE
//! ============
//! The gateway owns the session cookie. `TokenStore` abstracts where the token
//! lives so the auth session can be driven against an in-memory store in
//! tests and against the request's `CookieJar` in handlers.
//!
//! TRADE-OFFS
//! ==========
//! Removal is an overwrite with an empty, already-expired cookie rather than a
//! jar removal, so the `Set-Cookie` header always carries the same path and
//! flags the session cookie was issued with.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use super::rbac::Role;

pub const COOKIE_NAME: &str = "auth_token";
pub const SESSION_TTL_DAYS: i64 = 7;

// =============================================================================
// USER
// =============================================================================

/// The signed-in user as the gateway sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BackendUser")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Display name; the backend calls it `username`.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BackendId {
    Number(i64),
    Text(String),
}

/// Wire shape of a backend user record. Field names drift between endpoints.
#[derive(Deserialize)]
struct BackendUser {
    id: BackendId,
    #[serde(default)]
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rol: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl From<BackendUser> for User {
    fn from(raw: BackendUser) -> Self {
        let id = match raw.id {
            BackendId::Number(n) => n.to_string(),
            BackendId::Text(s) => s,
        };
        let name = raw.username.or(raw.name).unwrap_or_default();
        let role = raw
            .rol
            .or(raw.role)
            .filter(|r| !r.trim().is_empty())
            .map(|r| Role::parse(&r));
        Self { id, email: raw.email, name, role }
    }
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Where the session token is persisted between requests.
pub trait TokenStore {
    /// Current token, if a non-empty one is stored.
    fn token(&self) -> Option<String>;
    /// Persist `token` for `SESSION_TTL_DAYS`.
    fn store(&mut self, token: &str);
    /// Forget the token.
    fn clear(&mut self);
}

/// `TokenStore` backed by the request's cookie jar. Hand the jar back to axum
/// with [`CookieTokenStore::into_jar`] so the changes reach the response.
#[derive(Debug, Clone)]
pub struct CookieTokenStore {
    jar: CookieJar,
    secure: bool,
}

impl CookieTokenStore {
    #[must_use]
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl TokenStore for CookieTokenStore {
    fn token(&self) -> Option<String> {
        token_from_jar(&self.jar)
    }

    fn store(&mut self, token: &str) {
        let jar = std::mem::replace(&mut self.jar, CookieJar::new());
        self.jar = jar.add(session_cookie(token.to_owned(), self.secure));
    }

    fn clear(&mut self) {
        let jar = std::mem::replace(&mut self.jar, CookieJar::new());
        self.jar = jar.add(cleared_session_cookie(self.secure));
    }
}

/// Read a non-empty session token from a cookie jar.
#[must_use]
pub fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Session cookie: 7 days, strict same-site, secure when configured.
#[must_use]
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Expired, empty session cookie used to log the browser out.
#[must_use]
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
