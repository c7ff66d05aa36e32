// SPDX-License-Identifier: Apache-2.0

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::info;

use crate::http::guard::bearer_token;
use crate::middleware::request_tracing::RequestId;
use crate::state::unix_now;
use crate::AppState;

/// One `taskboard_audit` event per request when enabled. The user is taken
/// from a valid bearer token only; nothing is looked up in the store.
pub(crate) async fn audit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.enable_audit_log {
        return next.run(request).await;
    }
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default();
    let user = bearer_token(request.headers())
        .and_then(|token| state.signer.verify(token, unix_now()).ok())
        .map(|claims| claims.sub)
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(request).await;
    info!(
        target: "taskboard_audit",
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        request_id = %request_id,
        user = %user,
        latency_ms = started.elapsed().as_millis() as u64,
        "audit"
    );
    response
}
