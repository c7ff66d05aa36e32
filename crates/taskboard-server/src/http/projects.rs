// SPDX-License-Identifier: Apache-2.0

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use taskboard_api::{
    AddProjectMemberRequest, CreateProjectRequest, ProjectMemberResponse, ProjectResponse,
    UpdateProjectRequest,
};
use taskboard_model::{
    validate_description, validate_project_name, Email, Icon, ProjectId, ProjectStatus, UserId,
};
use taskboard_store::{
    MemberRecord, NewProject, ProjectPatch, ProjectRecord, SqliteStore, StoreError,
};
use tracing::info;

use super::convert;
use crate::error::AppError;
use crate::http::extract::{path_id, ApiJson};
use crate::http::guard::AuthUser;
use crate::AppState;

type ProjectView = (ProjectRecord, Vec<MemberRecord>);

fn with_members(
    store: &SqliteStore,
    projects: Vec<ProjectRecord>,
) -> Result<Vec<ProjectView>, StoreError> {
    projects
        .into_iter()
        .map(|p| {
            let members = store.members_of(p.id)?;
            Ok((p, members))
        })
        .collect()
}

fn render(views: Vec<ProjectView>) -> Vec<ProjectResponse> {
    views
        .into_iter()
        .map(|(p, m)| convert::project_response(p, m))
        .collect()
}

fn require_project(store: &SqliteStore, id: ProjectId) -> Result<ProjectRecord, StoreError> {
    store.project_by_id(id)?.ok_or(StoreError::NotFound("project"))
}

pub(crate) async fn created_by_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let views = state
        .db(move |store| with_members(store, store.projects_created_by(user.id)?))
        .await?;
    Ok(Json(render(views)))
}

pub(crate) async fn member_of(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ProjectResponse>>, AppError> {
    let views = state
        .db(move |store| with_members(store, store.projects_with_member(user.id)?))
        .await?;
    Ok(Json(render(views)))
}

pub(crate) async fn get(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<ProjectResponse>, AppError> {
    let id: ProjectId = path_id("id", &raw_id)?;
    let (project, members) = state
        .db(move |store| {
            let project = require_project(store, id)?;
            let members = store.members_of(id)?;
            Ok((project, members))
        })
        .await?;
    Ok(Json(convert::project_response(project, members)))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    caller.require_manager()?;
    let new_project = NewProject {
        name: validate_project_name(&req.name).map_err(AppError::invalid("name"))?,
        description: validate_description(req.description.as_deref())
            .map_err(AppError::invalid("description"))?,
        status: req.status.unwrap_or(ProjectStatus::New),
        icon: Icon::parse_optional(req.icon.as_deref()).map_err(AppError::invalid("icon"))?,
        created_by: caller.0.id,
    };
    let project = state
        .db(move |store| store.create_project(&new_project))
        .await?;
    info!(project_id = %project.id, user_id = %caller.0.id, "project created");
    Ok(Json(convert::project_response(project, Vec::new())))
}

/// Missing `status` keeps the stored one; missing `icon` keeps the stored icon.
pub(crate) async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(req): ApiJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, AppError> {
    caller.require_manager()?;
    let id: ProjectId = path_id("id", &raw_id)?;
    let name = validate_project_name(&req.name).map_err(AppError::invalid("name"))?;
    let description = validate_description(req.description.as_deref())
        .map_err(AppError::invalid("description"))?;
    let icon = Icon::parse_optional(req.icon.as_deref()).map_err(AppError::invalid("icon"))?;
    let status = req.status;

    let (project, members) = state
        .db(move |store| {
            let current = require_project(store, id)?;
            let patch = ProjectPatch {
                name,
                description,
                status: status.unwrap_or(current.status),
                icon,
            };
            let project = store.update_project(id, &patch)?;
            let members = store.members_of(id)?;
            Ok((project, members))
        })
        .await?;
    Ok(Json(convert::project_response(project, members)))
}

pub(crate) async fn delete(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let id: ProjectId = path_id("id", &raw_id)?;
    state.db(move |store| store.delete_project(id)).await?;
    info!(project_id = %id, user_id = %caller.0.id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn add_member(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(req): ApiJson<AddProjectMemberRequest>,
) -> Result<Json<ProjectMemberResponse>, AppError> {
    caller.require_manager()?;
    let id: ProjectId = path_id("id", &raw_id)?;
    let email = Email::parse(&req.user_email).map_err(AppError::invalid("userEmail"))?;
    let role = req.project_role;
    let member = state
        .db(move |store| {
            require_project(store, id)?;
            let user = store
                .user_by_email(&email)?
                .ok_or(StoreError::NotFound("user"))?;
            store.add_member(id, user.id, role)
        })
        .await?;
    Ok(Json(convert::member_response(member)))
}

pub(crate) async fn members(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<ProjectMemberResponse>>, AppError> {
    let id: ProjectId = path_id("id", &raw_id)?;
    let members = state
        .db(move |store| {
            require_project(store, id)?;
            store.members_of(id)
        })
        .await?;
    Ok(Json(
        members.into_iter().map(convert::member_response).collect(),
    ))
}

pub(crate) async fn remove_member(
    State(state): State<AppState>,
    caller: AuthUser,
    Path((raw_id, raw_user)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    caller.require_manager()?;
    let id: ProjectId = path_id("id", &raw_id)?;
    let user: UserId = path_id("userId", &raw_user)?;
    state
        .db(move |store| {
            require_project(store, id)?;
            if store.user_by_id(user)?.is_none() {
                return Err(StoreError::NotFound("user"));
            }
            store.remove_member(id, user)
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
