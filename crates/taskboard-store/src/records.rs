// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use taskboard_model::{
    CommentId, Email, Icon, MemberId, ProjectId, ProjectRole, ProjectStatus, Role, TaskId,
    TaskPriority, TaskStatus, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
    pub two_factor_enabled: bool,
    pub two_factor_secret: Option<String>,
    pub created_at: NaiveDateTime,
}

impl UserRecord {
    #[must_use]
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The user columns that travel with projects, members, tasks and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub icon: Option<Icon>,
    pub created_by: Option<UserSummary>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub icon: Option<Icon>,
    pub created_by: UserId,
}

/// Full replacement of the editable project fields. `icon: None` keeps the
/// stored icon.
#[derive(Debug, Clone)]
pub struct ProjectPatch {
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub id: MemberId,
    pub project_id: ProjectId,
    pub user: UserSummary,
    pub project_role: ProjectRole,
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub created_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDateTime>,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDateTime>,
    pub assigned_to: Option<UserId>,
}

impl TaskPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: CommentId,
    pub task_id: TaskId,
    pub comment: String,
    pub created_at: NaiveDateTime,
    pub author: Option<UserSummary>,
}
