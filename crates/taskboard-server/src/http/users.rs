// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::Json;
use taskboard_api::UserBasicInfo;

use super::convert;
use crate::error::AppError;
use crate::http::guard::AuthUser;
use crate::AppState;

pub(crate) async fn me(AuthUser(user): AuthUser) -> Json<UserBasicInfo> {
    Json(convert::user_basic(user))
}

pub(crate) async fn list(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<UserBasicInfo>>, AppError> {
    caller.require_manager_or_admin()?;
    let users = state.db(|store| store.list_users()).await?;
    Ok(Json(users.into_iter().map(convert::user_basic).collect()))
}
