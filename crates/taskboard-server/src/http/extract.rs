// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use taskboard_model::ValidationError;

use crate::error::AppError;
use crate::AppState;

/// `Json` with rejections rendered as `ApiError` instead of plain text.
pub(crate) struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Err(AppError::PayloadTooLarge(state.config.max_body_bytes))
            }
            Err(rejection) => Err(AppError::MalformedBody(rejection.body_text())),
        }
    }
}

/// Parses a raw path segment into an id, reporting failures against `field`.
pub(crate) fn path_id<T>(field: &'static str, raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = ValidationError>,
{
    raw.parse::<T>().map_err(AppError::invalid(field))
}
