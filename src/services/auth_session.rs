//! Auth session — the per-request owner of user, loading and error state.
//!
//! DESIGN
//! ======
//! `AuthSession` is an explicit value, not ambient state. A handler builds
//! one with the backend (`AuthApi`) and the token store for the current
//! request, drives it, then reads the resulting state, error, and navigation
//! target. All mutation goes through `&mut self`, so a session can never
//! have two logins in flight.
//!
//! STATES
//! ======
//! `Unknown` (loading) → `Authenticated(user)` | `Anonymous`.
//! Invariant: `Authenticated` only while the store holds the token that was
//! validated or issued.

use std::sync::Arc;

use super::backend::{AuthApi, BackendError, IssuedToken};
use super::forms::{FieldError, LoginForm, RegisterForm};
use super::rbac::Capabilities;
use super::session::{TokenStore, User};

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/login";

pub const LOGIN_FALLBACK_MESSAGE: &str = "Error al iniciar sesión";
pub const REGISTER_FALLBACK_MESSAGE: &str = "Error al registrarse";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unknown,
    Authenticated(User),
    Anonymous,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The form was rejected before reaching the backend.
    #[error("{}", .0.first().map_or("", |e| e.message))]
    Validation(Vec<FieldError>),

    /// The backend refused or could not be reached.
    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: BackendError,
    },
}

impl AuthError {
    /// Backend status to relay, if the backend produced one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(_) => None,
            Self::Backend { source, .. } => source.status(),
        }
    }
}

pub struct AuthSession<S: TokenStore> {
    api: Arc<dyn AuthApi>,
    store: S,
    state: AuthState,
    error: Option<String>,
    navigation: Option<&'static str>,
}

impl<S: TokenStore> AuthSession<S> {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, store: S) -> Self {
        Self { api, store, state: AuthState::Unknown, error: None, navigation: None }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match &self.state {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, AuthState::Unknown)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Where the caller should send the browser after the last operation.
    #[must_use]
    pub fn navigation(&self) -> Option<&'static str> {
        self.navigation
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_user(self.user())
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Resolve the persisted token, if any, into a user.
    ///
    /// A rejected token is treated as "not logged in": it is dropped from the
    /// store and no error is surfaced.
    pub async fn initialize(&mut self) -> &AuthState {
        let Some(token) = self.store.token() else {
            self.state = AuthState::Anonymous;
            return &self.state;
        };

        match self.api.validate_token(&token).await {
            Ok(user) => {
                self.state = AuthState::Authenticated(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "stored token rejected; clearing session");
                self.store.clear();
                self.state = AuthState::Anonymous;
            }
        }
        &self.state
    }

    /// Validate the form, exchange credentials, persist the token.
    ///
    /// # Errors
    ///
    /// Validation failures or the backend's refusal. The error message is
    /// also kept in [`AuthSession::error`].
    pub async fn login(&mut self, form: &LoginForm) -> Result<User, AuthError> {
        self.begin_attempt();
        if let Err(errors) = form.validate() {
            return Err(self.reject_form(errors));
        }

        match self.api.login(form.email.trim(), &form.password).await {
            Ok(issued) => Ok(self.accept(issued)),
            Err(e) => Err(self.reject_backend(e, LOGIN_FALLBACK_MESSAGE)),
        }
    }

    /// Validate the form, create the account, persist the issued token.
    ///
    /// # Errors
    ///
    /// Validation failures or the backend's refusal. The error message is
    /// also kept in [`AuthSession::error`].
    pub async fn register(&mut self, form: &RegisterForm) -> Result<User, AuthError> {
        self.begin_attempt();
        if let Err(errors) = form.validate() {
            return Err(self.reject_form(errors));
        }

        match self
            .api
            .register(form.name.trim(), form.email.trim(), &form.password)
            .await
        {
            Ok(issued) => Ok(self.accept(issued)),
            Err(e) => Err(self.reject_backend(e, REGISTER_FALLBACK_MESSAGE)),
        }
    }

    /// Purely local: forget the token and send the browser to `/login`.
    pub fn logout(&mut self) {
        self.store.clear();
        self.state = AuthState::Anonymous;
        self.navigation = Some(LOGIN_PATH);
    }

    fn begin_attempt(&mut self) {
        self.error = None;
        self.navigation = None;
    }

    fn accept(&mut self, issued: IssuedToken) -> User {
        self.store.store(&issued.token);
        self.state = AuthState::Authenticated(issued.user.clone());
        self.navigation = Some(DASHBOARD_PATH);
        tracing::info!(user_id = %issued.user.id, "session established");
        issued.user
    }

    fn reject_form(&mut self, errors: Vec<FieldError>) -> AuthError {
        self.error = errors.first().map(|e| e.message.to_string());
        AuthError::Validation(errors)
    }

    fn reject_backend(&mut self, source: BackendError, fallback: &str) -> AuthError {
        tracing::warn!(error = %source, "auth attempt rejected");
        let message = source.detail().unwrap_or(fallback).to_string();
        self.error = Some(message.clone());
        if matches!(self.state, AuthState::Unknown) {
            self.state = AuthState::Anonymous;
        }
        AuthError::Backend { message, source }
    }
}

#[cfg(test)]
#[path = "auth_session_test.rs"]
mod tests;
