// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::Json;
use taskboard_api::{CreateCommentRequest, TaskCommentResponse};
use taskboard_model::{validate_comment, TaskId};
use taskboard_store::StoreError;

use super::convert;
use crate::error::AppError;
use crate::http::extract::{path_id, ApiJson};
use crate::http::guard::AuthUser;
use crate::AppState;

pub(crate) async fn list(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<TaskCommentResponse>>, AppError> {
    let task: TaskId = path_id("id", &raw_id)?;
    let comments = state
        .db(move |store| {
            if store.task_by_id(task)?.is_none() {
                return Err(StoreError::NotFound("task"));
            }
            store.comments_for_task(task)
        })
        .await?;
    Ok(Json(
        comments.into_iter().map(convert::comment_response).collect(),
    ))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> Result<Json<TaskCommentResponse>, AppError> {
    let task: TaskId = path_id("id", &raw_id)?;
    let text = validate_comment(&req.comment).map_err(AppError::invalid("comment"))?;
    let comment = state
        .db(move |store| store.add_comment(task, user.id, &text))
        .await?;
    Ok(Json(convert::comment_response(comment)))
}
