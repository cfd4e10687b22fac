//! JSON error responses.
//!
//! Every failure leaves the gateway as `(status, {"message": ...})`, with
//! `errors` added for form validation. Backend statuses are relayed as-is;
//! a backend that never answered is a `502`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::services::auth_session::AuthError;
use crate::services::backend::BackendError;
use crate::services::budget::PlanError;
use crate::services::evcs::EvcError;
use crate::services::forms::FieldError;
use crate::services::notification_rules::RuleError;
use crate::services::providers::BulkError;
use crate::services::storage::StorageError;

pub const MSG_BACKEND_UNAVAILABLE: &str = "Backend unavailable";
pub const MSG_BAD_BACKEND_RESPONSE: &str = "Invalid backend response";
pub const MSG_FORBIDDEN: &str = "No tienes permisos para realizar esta acción";
pub const MSG_STORAGE_DISABLED: &str = "Document storage is not configured";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<FieldError>,
}

#[derive(Serialize)]
struct Body<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), errors: Vec::new() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, MSG_FORBIDDEN)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub fn validation(errors: Vec<FieldError>) -> Self {
        let message = errors.first().map_or("", |e| e.message).to_string();
        Self { status: StatusCode::UNPROCESSABLE_ENTITY, message, errors }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errors = (!self.errors.is_empty()).then_some(self.errors.as_slice());
        let body = Body { message: &self.message, errors };
        (self.status, Json(body)).into_response()
    }
}

fn relayed_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api { status, detail } => {
                let message = detail.unwrap_or_else(|| format!("backend returned status {status}"));
                Self::new(relayed_status(status), message)
            }
            BackendError::Transport(_) => Self::new(StatusCode::BAD_GATEWAY, MSG_BACKEND_UNAVAILABLE),
            BackendError::Parse(_) => Self::new(StatusCode::BAD_GATEWAY, MSG_BAD_BACKEND_RESPONSE),
            BackendError::HttpClientBuild(e) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::validation(errors),
            AuthError::Backend { message, source } => {
                let status = source.status().map_or(StatusCode::BAD_GATEWAY, relayed_status);
                Self::new(status, message)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "request body rejected");
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileName(_) => Self::bad_request(err.to_string()),
            other => {
                tracing::error!(error = %other, "storage call failed");
                Self::new(StatusCode::BAD_GATEWAY, other.to_string())
            }
        }
    }
}

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<BulkError> for ApiError {
    fn from(err: BulkError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

impl From<EvcError> for ApiError {
    fn from(err: EvcError) -> Self {
        match err {
            EvcError::BadEntorno(_) => Self::bad_request(err.to_string()),
            EvcError::MissingProvider | EvcError::MissingQuarter => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
