//! Backend passthrough shared by the resource routes.

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use reqwest::Method;
use serde_json::Value;

use super::error::ApiError;
use crate::services::backend::BackendError;
use crate::services::session::token_from_jar;
use crate::state::AppState;

/// The session cookie, if any, unvalidated. Reads forward it as a bearer
/// token and let the backend decide.
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for SessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(token_from_jar(&CookieJar::from_headers(&parts.headers))))
    }
}

/// `Json<T>` whose rejection is an `ApiError`, so a malformed body answers
/// with the same `{message}` shape as every other failure.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Send the call and answer with the backend's status and body.
///
/// # Errors
///
/// Any backend failure, mapped by `ApiError`.
pub async fn relay(
    state: &AppState,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> Result<Response, ApiError> {
    let (status, value) = state.backend.forward(method, path, token, body).await?;
    if value.is_null() && status == StatusCode::NO_CONTENT {
        return Ok(status.into_response());
    }
    Ok((status, Json(value)).into_response())
}

/// `GET path` decoded as a list. A `404` reads as an empty list.
///
/// # Errors
///
/// Any other backend failure, or a body that is not a JSON array.
pub async fn fetch_list(state: &AppState, path: &str, token: Option<&str>) -> Result<Vec<Value>, ApiError> {
    match state.backend.get_json(path, token).await {
        Ok(Value::Array(items)) => Ok(items),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(_) => Err(BackendError::Parse(format!("expected a list from {path}")).into()),
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Decode a backend value into a typed record.
///
/// # Errors
///
/// `502` when the backend sent something of the wrong shape.
pub fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(error = %e, "unexpected backend record shape");
        BackendError::Parse(e.to_string()).into()
    })
}
