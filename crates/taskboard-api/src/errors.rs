// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const UNKNOWN_REQUEST_ID: &str = "req-unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Timeout,
    Conflict,
    PayloadTooLarge,
    RateLimited,
    Internal,
    NotReady,
}

impl ApiErrorCode {
    pub const ALL: &'static [ApiErrorCode] = &[
        Self::ValidationFailed,
        Self::InvalidCredentials,
        Self::Unauthenticated,
        Self::Forbidden,
        Self::NotFound,
        Self::MethodNotAllowed,
        Self::Timeout,
        Self::Conflict,
        Self::PayloadTooLarge,
        Self::RateLimited,
        Self::Internal,
        Self::NotReady,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::Unauthenticated => "Unauthenticated",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::Timeout => "Timeout",
            Self::Conflict => "Conflict",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::RateLimited => "RateLimited",
            Self::Internal => "Internal",
            Self::NotReady => "NotReady",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiErrorEnvelope {
    pub error: ApiError,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: UNKNOWN_REQUEST_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn validation_failed(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            ApiErrorCode::ValidationFailed,
            format!("validation failed: {field}"),
            json!({"field_errors": [{"field": field, "reason": reason}]}),
        )
    }

    #[must_use]
    pub fn malformed_body(reason: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "malformed request body",
            json!({"reason": reason.into()}),
        )
    }

    /// Same message for unknown accounts, wrong passwords and wrong codes.
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::new(
            ApiErrorCode::InvalidCredentials,
            "invalid email, password or verification code",
            json!({}),
        )
    }

    #[must_use]
    pub fn unauthenticated(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::Unauthenticated,
            "authentication required",
            json!({"reason": reason}),
        )
    }

    #[must_use]
    pub fn forbidden(required: &str) -> Self {
        Self::new(
            ApiErrorCode::Forbidden,
            "insufficient role",
            json!({"required": required}),
        )
    }

    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            format!("{entity} not found"),
            json!({"entity": entity}),
        )
    }

    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(
            ApiErrorCode::MethodNotAllowed,
            "method not allowed for this route",
            json!({}),
        )
    }

    #[must_use]
    pub fn timeout(limit_ms: u128) -> Self {
        Self::new(
            ApiErrorCode::Timeout,
            "request timed out",
            json!({"limit_ms": limit_ms}),
        )
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Conflict, message, json!({}))
    }

    #[must_use]
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ApiErrorCode::PayloadTooLarge,
            "request body too large",
            json!({"limit_bytes": limit_bytes}),
        )
    }

    #[must_use]
    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::new(
            ApiErrorCode::RateLimited,
            "too many attempts",
            json!({"retry_after_secs": retry_after_secs}),
        )
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "internal error", json!({}))
    }

    #[must_use]
    pub fn not_ready() -> Self {
        Self::new(ApiErrorCode::NotReady, "service not ready", json!({}))
    }

    #[must_use]
    pub fn into_envelope(self) -> ApiErrorEnvelope {
        ApiErrorEnvelope { error: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_uses_camel_case_request_id() {
        let body = serde_json::to_value(
            ApiError::not_found("project")
                .with_request_id("req-1")
                .into_envelope(),
        )
        .expect("json");
        assert_eq!(body["error"]["code"], "NotFound");
        assert_eq!(body["error"]["requestId"], "req-1");
        assert_eq!(body["error"]["details"]["entity"], "project");
    }

    #[test]
    fn code_names_match_serde() {
        for code in ApiErrorCode::ALL {
            let json = serde_json::to_string(code).expect("json");
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }
}
