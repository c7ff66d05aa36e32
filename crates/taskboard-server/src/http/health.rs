// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use taskboard_api::openapi_v1_spec;

use crate::error::AppError;
use crate::AppState;

pub(crate) async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Ready once startup finished and the database answers.
pub(crate) async fn readyz(State(state): State<AppState>) -> Result<&'static str, AppError> {
    if !state.ready.load(Ordering::Relaxed) {
        return Err(AppError::NotReady);
    }
    state
        .db(|store| store.ping())
        .await
        .map_err(|_| AppError::NotReady)?;
    Ok("ready")
}

pub(crate) async fn openapi() -> Json<Value> {
    Json(openapi_v1_spec())
}

pub(crate) async fn not_found() -> AppError {
    AppError::NotFound("route")
}
