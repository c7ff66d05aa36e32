// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use taskboard_api::{ChangeRoleRequest, UserResponse, ROLE_UPDATED_MESSAGE};
use taskboard_model::{Email, Role};
use tracing::info;

use super::convert;
use crate::error::AppError;
use crate::http::extract::ApiJson;
use crate::http::guard::AuthUser;
use crate::AppState;

pub(crate) async fn change_role(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<ChangeRoleRequest>,
) -> Result<(StatusCode, &'static str), AppError> {
    caller.require_admin()?;
    let email = Email::parse(&req.email).map_err(AppError::invalid("email"))?;
    let role = Role::parse_assignable(&req.new_role).map_err(AppError::invalid("newRole"))?;

    let target = email.clone();
    state
        .db(move |store| store.set_role(&target, role))
        .await?;
    info!(admin = %caller.0.email, email = %email, role = %role, "role changed");
    Ok((StatusCode::OK, ROLE_UPDATED_MESSAGE))
}

pub(crate) async fn users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    caller.require_admin()?;
    let users = state.db(|store| store.list_users()).await?;
    Ok(Json(users.into_iter().map(convert::user_response).collect()))
}

