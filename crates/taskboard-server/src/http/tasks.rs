// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskboard_api::{
    CreateTaskRequest, TaskAssigneeDetailsResponse, TaskDetailsResponse, TaskResponse,
    TaskWithAssigneeResponse, UpdateTaskRequest,
};
use taskboard_model::{
    validate_description, validate_task_title, ProjectId, TaskId, TaskStatus,
};
use taskboard_store::{NewTask, SqliteStore, StoreError, TaskPatch, TaskRecord};
use tracing::info;

use super::convert;
use crate::error::AppError;
use crate::http::extract::{path_id, ApiJson};
use crate::http::guard::AuthUser;
use crate::AppState;

fn require_task(store: &SqliteStore, id: TaskId) -> Result<TaskRecord, StoreError> {
    store.task_by_id(id)?.ok_or(StoreError::NotFound("task"))
}

fn require_project(store: &SqliteStore, id: ProjectId) -> Result<(), StoreError> {
    store
        .project_by_id(id)?
        .map(|_| ())
        .ok_or(StoreError::NotFound("project"))
}

async fn load(state: &AppState, raw_id: &str) -> Result<TaskRecord, AppError> {
    let id: TaskId = path_id("id", raw_id)?;
    state.db(move |store| require_task(store, id)).await
}

fn patch_from(req: UpdateTaskRequest) -> Result<TaskPatch, AppError> {
    Ok(TaskPatch {
        title: req
            .title
            .as_deref()
            .map(validate_task_title)
            .transpose()
            .map_err(AppError::invalid("title"))?,
        description: validate_description(req.description.as_deref())
            .map_err(AppError::invalid("description"))?,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
        assigned_to: req.assigned_to_id,
    })
}

pub(crate) async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let new_task = NewTask {
        project_id: req.project_id,
        title: validate_task_title(&req.title).map_err(AppError::invalid("title"))?,
        description: validate_description(req.description.as_deref())
            .map_err(AppError::invalid("description"))?,
        status: req.status,
        priority: req.priority,
        due_date: req.due_date,
        created_by: user.id,
        assigned_to: req.assigned_to_id,
    };
    let task = state.db(move |store| store.create_task(&new_task)).await?;
    info!(task_id = %task.id, project_id = %task.project_id, "task created");
    Ok(Json(convert::task_response(task)))
}

/// Only fields present in the body change.
pub(crate) async fn update(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(req): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let id: TaskId = path_id("id", &raw_id)?;
    let patch = patch_from(req)?;
    let task = state
        .db(move |store| {
            if patch.is_empty() {
                require_task(store, id)
            } else {
                store.update_task(id, &patch)
            }
        })
        .await?;
    Ok(Json(convert::task_response(task)))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: TaskId = path_id("id", &raw_id)?;
    state.db(move |store| store.delete_task(id)).await?;
    info!(task_id = %id, user_id = %caller.0.id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let tasks = state
        .db(move |store| store.tasks_assigned_to(user.id))
        .await?;
    Ok(Json(tasks.into_iter().map(convert::task_response).collect()))
}

pub(crate) async fn mine_in_project(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(raw_project): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let project: ProjectId = path_id("projectId", &raw_project)?;
    let tasks = state
        .db(move |store| {
            require_project(store, project)?;
            store.tasks_in_project_assigned_to(project, user.id)
        })
        .await?;
    Ok(Json(tasks.into_iter().map(convert::task_response).collect()))
}

pub(crate) async fn all_in_project(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_project): Path<String>,
) -> Result<Json<Vec<TaskWithAssigneeResponse>>, AppError> {
    let project: ProjectId = path_id("projectId", &raw_project)?;
    let tasks = state
        .db(move |store| {
            require_project(store, project)?;
            store.tasks_in_project(project)
        })
        .await?;
    Ok(Json(
        tasks.into_iter().map(convert::task_with_assignee).collect(),
    ))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskWithAssigneeResponse>, AppError> {
    Ok(Json(convert::task_with_assignee(load(&state, &raw_id).await?)))
}

pub(crate) async fn details(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskDetailsResponse>, AppError> {
    Ok(Json(convert::task_details(load(&state, &raw_id).await?)))
}

pub(crate) async fn assignee(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskAssigneeDetailsResponse>, AppError> {
    Ok(Json(convert::task_assignee_details(
        load(&state, &raw_id).await?,
    )))
}

/// Tasks already under review, verified or archived are a `Conflict`.
pub(crate) async fn submit_for_review(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskWithAssigneeResponse>, AppError> {
    let id: TaskId = path_id("id", &raw_id)?;
    let task = state
        .db(move |store| {
            let current = require_task(store, id)?;
            if let Some(status) = current.status {
                if !status.can_submit_for_review() {
                    return Err(StoreError::Conflict(format!(
                        "task in status {status} cannot be submitted for review"
                    )));
                }
            }
            store.set_task_status(id, TaskStatus::ToReview)
        })
        .await?;
    info!(task_id = %id, user_id = %caller.0.id, "task submitted for review");
    Ok(Json(convert::task_with_assignee(task)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_produces_empty_patch() {
        let patch = patch_from(UpdateTaskRequest::default()).expect("patch");
        assert!(patch.is_empty());
    }

    #[test]
    fn blank_title_is_rejected_but_absent_title_is_fine() {
        let req = UpdateTaskRequest {
            title: Some("   ".to_string()),
            ..UpdateTaskRequest::default()
        };
        assert!(matches!(
            patch_from(req),
            Err(AppError::Validation { field: "title", .. })
        ));
        let req = UpdateTaskRequest {
            status: Some(TaskStatus::Done),
            ..UpdateTaskRequest::default()
        };
        assert_eq!(patch_from(req).expect("patch").status, Some(TaskStatus::Done));
    }
}
