// SPDX-License-Identifier: Apache-2.0

//! Store records to wire DTOs.

use taskboard_api as api;
use taskboard_store::{CommentRecord, MemberRecord, ProjectRecord, TaskRecord, UserRecord};

fn name_parts(
    user: Option<&taskboard_store::UserSummary>,
) -> (Option<String>, Option<String>, Option<String>) {
    user.map_or((None, None, None), |u| {
        (
            Some(u.first_name.clone()),
            Some(u.last_name.clone()),
            Some(u.email.to_string()),
        )
    })
}

pub(crate) fn summary(user: taskboard_store::UserSummary) -> api::UserSummary {
    api::UserSummary {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email.into(),
    }
}

pub(crate) fn user_basic(user: UserRecord) -> api::UserBasicInfo {
    api::UserBasicInfo {
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email.into(),
    }
}

pub(crate) fn user_response(user: UserRecord) -> api::UserResponse {
    api::UserResponse {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email.into(),
        role: user.role,
    }
}

pub(crate) fn project_response(
    project: ProjectRecord,
    members: Vec<MemberRecord>,
) -> api::ProjectResponse {
    api::ProjectResponse {
        id: project.id,
        name: project.name,
        description: project.description,
        status: project.status,
        icon: project.icon.map(String::from),
        created_at: project.created_at,
        updated_at: project.updated_at,
        created_by: project.created_by.map(summary),
        members: members
            .into_iter()
            .map(|m| api::ProjectMemberEntry {
                id: m.id,
                user: summary(m.user),
                project_role: m.project_role,
                joined_at: m.joined_at,
            })
            .collect(),
    }
}

pub(crate) fn member_response(member: MemberRecord) -> api::ProjectMemberResponse {
    api::ProjectMemberResponse {
        id: member.id,
        user_id: member.user.id,
        user_email: member.user.email.into(),
        first_name: member.user.first_name,
        last_name: member.user.last_name,
        project_role: member.project_role,
        joined_at: member.joined_at,
    }
}

pub(crate) fn task_response(task: TaskRecord) -> api::TaskResponse {
    api::TaskResponse {
        id: task.id,
        project_id: task.project_id,
        title: task.title,
        description: task.description,
        status: task.status,
        priority: task.priority,
        created_at: task.created_at,
        updated_at: task.updated_at,
        due_date: task.due_date,
        created_by: task.created_by.map(summary),
        assigned_to: task.assigned_to.map(summary),
    }
}

pub(crate) fn task_with_assignee(task: TaskRecord) -> api::TaskWithAssigneeResponse {
    let (first, last, _) = name_parts(task.assigned_to.as_ref());
    api::TaskWithAssigneeResponse {
        id: task.id,
        title: task.title,
        description: task.description,
        status: task.status,
        priority: task.priority,
        created_at: task.created_at,
        updated_at: task.updated_at,
        due_date: task.due_date,
        assigned_first_name: first,
        assigned_last_name: last,
    }
}

pub(crate) fn task_assignee_details(task: TaskRecord) -> api::TaskAssigneeDetailsResponse {
    let (first, last, email) = name_parts(task.assigned_to.as_ref());
    api::TaskAssigneeDetailsResponse {
        id: task.id,
        title: task.title,
        description: task.description,
        status: task.status,
        priority: task.priority,
        created_at: task.created_at,
        updated_at: task.updated_at,
        due_date: task.due_date,
        assigned_first_name: first,
        assigned_last_name: last,
        assigned_email: email,
    }
}

pub(crate) fn task_details(task: TaskRecord) -> api::TaskDetailsResponse {
    let (creator_first, creator_last, creator_email) = name_parts(task.created_by.as_ref());
    let (assigned_first, assigned_last, assigned_email) = name_parts(task.assigned_to.as_ref());
    api::TaskDetailsResponse {
        id: task.id,
        project_id: task.project_id,
        title: task.title,
        description: task.description,
        status: task.status,
        priority: task.priority,
        created_at: task.created_at,
        updated_at: task.updated_at,
        due_date: task.due_date,
        creator_first_name: creator_first,
        creator_last_name: creator_last,
        creator_email,
        assigned_to_id: task.assigned_to.as_ref().map(|u| u.id),
        assigned_first_name: assigned_first,
        assigned_last_name: assigned_last,
        assigned_email,
    }
}

pub(crate) fn comment_response(comment: CommentRecord) -> api::TaskCommentResponse {
    let (first, last, email) = name_parts(comment.author.as_ref());
    api::TaskCommentResponse {
        id: comment.id,
        comment: comment.comment,
        created_at: comment.created_at,
        author_first_name: first,
        author_last_name: last,
        author_email: email,
    }
}
