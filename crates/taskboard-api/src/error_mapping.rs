// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
    /// Whether the response should carry `retry-after`.
    pub retryable: bool,
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = match error.code {
        ApiErrorCode::ValidationFailed => 400,
        ApiErrorCode::InvalidCredentials | ApiErrorCode::Unauthenticated => 401,
        ApiErrorCode::Forbidden => 403,
        ApiErrorCode::NotFound => 404,
        ApiErrorCode::MethodNotAllowed => 405,
        ApiErrorCode::Timeout => 408,
        ApiErrorCode::Conflict => 409,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::RateLimited => 429,
        ApiErrorCode::NotReady => 503,
        ApiErrorCode::Internal => 500,
    };
    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
        retryable: matches!(status_code, 429 | 503),
    }
}
