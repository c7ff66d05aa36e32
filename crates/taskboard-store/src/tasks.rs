// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use taskboard_model::{ProjectId, TaskId, TaskStatus, UserId};

use crate::records::{NewTask, TaskPatch, TaskRecord};
use crate::row;
use crate::time::{format_timestamp, now_utc};
use crate::{projects, users, SqliteStore, StoreError};

const TASK_SELECT: &str = "SELECT t.id, t.project_id, t.title, t.description, t.status, \
     t.priority, t.created_at, t.updated_at, t.due_date, \
     c.id, c.first_name, c.last_name, c.email, \
     a.id, a.first_name, a.last_name, a.email \
     FROM tasks t \
     LEFT JOIN users c ON c.id = t.created_by \
     LEFT JOIN users a ON a.id = t.assigned_to";

fn task_from_row(r: &Row<'_>) -> rusqlite::Result<TaskRecord> {
    let id: i64 = r.get(0)?;
    Ok(TaskRecord {
        id: TaskId::new(id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
        })?,
        project_id: row::parsed(r, 1)?,
        title: r.get(2)?,
        description: r.get(3)?,
        status: row::parsed_opt(r, 4)?,
        priority: row::parsed_opt(r, 5)?,
        created_at: row::timestamp(r, 6)?,
        updated_at: row::timestamp(r, 7)?,
        due_date: row::timestamp_opt(r, 8)?,
        created_by: row::user_summary_opt(r, 9)?,
        assigned_to: row::user_summary_opt(r, 13)?,
    })
}

pub(crate) fn find(conn: &Connection, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{TASK_SELECT} WHERE t.id = ?1"),
            params![id.get()],
            task_from_row,
        )
        .optional()?)
}

pub(crate) fn exists(conn: &Connection, id: TaskId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row("SELECT 1 FROM tasks WHERE id = ?1", params![id.get()], |_| {
            Ok(())
        })
        .optional()?
        .is_some())
}

fn query_tasks(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<TaskRecord>, StoreError> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT} WHERE {filter} ORDER BY t.id"))?;
    let rows = stmt.query_map(params, task_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn timestamp_param(value: Option<&NaiveDateTime>) -> Option<String> {
    value.map(format_timestamp)
}

impl SqliteStore {
    /// Unknown project or assignee is `NotFound`.
    pub fn create_task(&self, task: &NewTask) -> Result<TaskRecord, StoreError> {
        self.with_conn(|conn| {
            if !projects::exists(conn, task.project_id)? {
                return Err(StoreError::NotFound("project"));
            }
            if let Some(assignee) = task.assigned_to {
                if !users::exists(conn, assignee)? {
                    return Err(StoreError::NotFound("user"));
                }
            }
            let now = format_timestamp(&now_utc());
            conn.execute(
                "INSERT INTO tasks (project_id, title, description, status, priority, created_at, updated_at, due_date, created_by, assigned_to)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, ?7, ?8, ?9)",
                params![
                    task.project_id.to_string(),
                    task.title,
                    task.description,
                    task.status.map(TaskStatus::as_str),
                    task.priority.map(|p| p.as_str()),
                    now,
                    timestamp_param(task.due_date.as_ref()),
                    task.created_by.get(),
                    task.assigned_to.map(UserId::get),
                ],
            )?;
            let id = TaskId::new(conn.last_insert_rowid())
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            find(conn, id)?.ok_or(StoreError::NotFound("task"))
        })
    }

    pub fn task_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        self.with_conn(|conn| find(conn, id))
    }

    /// Only the fields present in `patch` change; `updated_at` is always
    /// bumped.
    pub fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<TaskRecord, StoreError> {
        self.with_conn(|conn| {
            if let Some(assignee) = patch.assigned_to {
                if !users::exists(conn, assignee)? {
                    return Err(StoreError::NotFound("user"));
                }
            }
            let changed = conn.execute(
                "UPDATE tasks SET
                   title = COALESCE(?1, title),
                   description = COALESCE(?2, description),
                   status = COALESCE(?3, status),
                   priority = COALESCE(?4, priority),
                   due_date = COALESCE(?5, due_date),
                   assigned_to = COALESCE(?6, assigned_to),
                   updated_at = ?7
                 WHERE id = ?8",
                params![
                    patch.title,
                    patch.description,
                    patch.status.map(TaskStatus::as_str),
                    patch.priority.map(|p| p.as_str()),
                    timestamp_param(patch.due_date.as_ref()),
                    patch.assigned_to.map(UserId::get),
                    format_timestamp(&now_utc()),
                    id.get(),
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound("task"));
            }
            find(conn, id)?.ok_or(StoreError::NotFound("task"))
        })
    }

    pub fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id.get()])?;
            if changed == 0 {
                return Err(StoreError::NotFound("task"));
            }
            Ok(())
        })
    }

    pub fn tasks_in_project(&self, project: ProjectId) -> Result<Vec<TaskRecord>, StoreError> {
        self.with_conn(|conn| query_tasks(conn, "t.project_id = ?1", params![project.to_string()]))
    }

    pub fn tasks_in_project_assigned_to(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        self.with_conn(|conn| {
            query_tasks(
                conn,
                "t.project_id = ?1 AND t.assigned_to = ?2",
                params![project.to_string(), user.get()],
            )
        })
    }

    pub fn tasks_assigned_to(&self, user: UserId) -> Result<Vec<TaskRecord>, StoreError> {
        self.with_conn(|conn| query_tasks(conn, "t.assigned_to = ?1", params![user.get()]))
    }

    pub fn set_task_status(&self, id: TaskId, status: TaskStatus) -> Result<TaskRecord, StoreError> {
        self.update_task(
            id,
            &TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        )
    }
}
