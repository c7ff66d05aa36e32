// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use taskboard_api::ApiError;
use tracing::Instrument;

use crate::AppState;

pub(crate) const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id attached to request extensions for downstream layers.
#[derive(Debug, Clone)]
pub(crate) struct RequestId(pub String);

fn acceptable_request_id(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_REQUEST_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
}

pub(crate) fn extract_request_id(headers: &HeaderMap, state: &AppState) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| acceptable_request_id(v))
        .map_or_else(
            || {
                let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
                format!("req-{id:016x}")
            },
            ToString::to_string,
        )
}

/// Envelope for framework responses that carry no `ApiError` of their own.
fn framework_error(status: StatusCode, state: &AppState) -> Option<ApiError> {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => Some(ApiError::method_not_allowed()),
        StatusCode::REQUEST_TIMEOUT => {
            Some(ApiError::timeout(state.config.request_timeout.as_millis()))
        }
        _ => None,
    }
}

pub(crate) async fn request_tracing_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let request_id = extract_request_id(request.headers(), &state);
    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let mut response = next.run(request).instrument(span).await;
    let err = response
        .extensions_mut()
        .remove::<ApiError>()
        .or_else(|| framework_error(response.status(), &state));
    if let Some(err) = err {
        let envelope = err.with_request_id(request_id.clone()).into_envelope();
        if let Ok(body) = serde_json::to_vec(&envelope) {
            response.headers_mut().remove(CONTENT_LENGTH);
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *response.body_mut() = Body::from(body);
        }
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
