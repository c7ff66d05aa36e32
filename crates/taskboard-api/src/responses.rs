// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use taskboard_model::{
    CommentId, MemberId, ProjectId, ProjectRole, ProjectStatus, Role, TaskId, TaskPriority,
    TaskStatus, UserId,
};

/// Result of register, login, 2FA verification and 2FA enrolment.
///
/// `token` is absent while a second factor is still required. Enrolment
/// fills the QR fields instead of a token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: Option<String>,
    #[serde(rename = "requires2FA")]
    pub requires_2fa: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otpauth_uri: Option<String>,
}

impl AuthResponse {
    #[must_use]
    pub fn token(token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn second_factor_required() -> Self {
        Self {
            requires_2fa: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn enrolment(qr_code_image: String, otpauth_uri: String) -> Self {
        Self {
            qr_code_image: Some(qr_code_image),
            otpauth_uri: Some(otpauth_uri),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBasicInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberEntry {
    pub id: MemberId,
    pub user: UserSummary,
    pub project_role: ProjectRole,
    #[serde(with = "crate::timestamp")]
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub icon: Option<String>,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    pub updated_at: NaiveDateTime,
    pub created_by: Option<UserSummary>,
    pub members: Vec<ProjectMemberEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberResponse {
    pub id: MemberId,
    pub user_id: UserId,
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub project_role: ProjectRole,
    #[serde(with = "crate::timestamp")]
    pub joined_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(with = "crate::timestamp::option")]
    pub due_date: Option<NaiveDateTime>,
    pub created_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithAssigneeResponse {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(with = "crate::timestamp::option")]
    pub due_date: Option<NaiveDateTime>,
    pub assigned_first_name: Option<String>,
    pub assigned_last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssigneeDetailsResponse {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(with = "crate::timestamp::option")]
    pub due_date: Option<NaiveDateTime>,
    pub assigned_first_name: Option<String>,
    pub assigned_last_name: Option<String>,
    pub assigned_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetailsResponse {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(with = "crate::timestamp")]
    pub updated_at: NaiveDateTime,
    #[serde(with = "crate::timestamp::option")]
    pub due_date: Option<NaiveDateTime>,
    pub creator_first_name: Option<String>,
    pub creator_last_name: Option<String>,
    pub creator_email: Option<String>,
    pub assigned_to_id: Option<UserId>,
    pub assigned_first_name: Option<String>,
    pub assigned_last_name: Option<String>,
    pub assigned_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCommentResponse {
    pub id: CommentId,
    pub comment: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: NaiveDateTime,
    pub author_first_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_email: Option<String>,
}
