// SPDX-License-Identifier: Apache-2.0

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskboard_api::{map_error, ApiError};
use taskboard_auth::AuthError;
use taskboard_model::ValidationError;
use taskboard_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Everything a handler can fail with. Rendered as the `{"error": ...}`
/// envelope; the request id is filled in by the tracing middleware.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("malformed body: {0}")]
    MalformedBody(String),

    #[error("body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),

    #[error("requires role {0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("not ready")]
    NotReady,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub(crate) fn invalid(field: &'static str) -> impl FnOnce(ValidationError) -> Self {
        move |err| Self::Validation {
            field,
            reason: err.0,
        }
    }

    #[must_use]
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Validation { field, reason } => ApiError::validation_failed(field, reason),
            Self::MalformedBody(reason) => ApiError::malformed_body(reason),
            Self::PayloadTooLarge(limit) => ApiError::payload_too_large(*limit),
            Self::InvalidCredentials => ApiError::invalid_credentials(),
            Self::Unauthenticated(reason) => ApiError::unauthenticated(reason),
            Self::Forbidden(required) => ApiError::forbidden(required),
            Self::NotFound(entity) => ApiError::not_found(entity),
            Self::Conflict(message) => ApiError::conflict(message),
            Self::RateLimited(secs) => ApiError::rate_limited(*secs),
            Self::NotReady => ApiError::not_ready(),
            Self::Store(_) | Self::Auth(_) | Self::Internal(_) => ApiError::internal(),
        }
    }

    fn retry_after_secs(&self) -> u64 {
        match self {
            Self::RateLimited(secs) => *secs,
            _ => 3,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => Self::NotFound(entity),
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_) | Self::Auth(_) | Self::Internal(_)) {
            error!(error = %self, "request failed");
        }
        let retry_after = self.retry_after_secs();
        api_error_response(self.to_api_error(), retry_after)
    }
}

/// Renders `err` and stashes a copy in the response extensions so that the
/// request tracing middleware can re-render it with the real request id.
#[must_use]
pub(crate) fn api_error_response(err: ApiError, retry_after_secs: u64) -> Response {
    let mapping = map_error(&err);
    let status =
        StatusCode::from_u16(mapping.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut resp = (status, Json(err.clone().into_envelope())).into_response();
    if mapping.retryable {
        if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
            resp.headers_mut().insert("retry-after", value);
        }
    }
    resp.extensions_mut().insert(err);
    resp
}
