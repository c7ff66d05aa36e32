// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, Row};
use taskboard_model::{CommentId, TaskId, UserId};

use crate::records::CommentRecord;
use crate::row;
use crate::time::{format_timestamp, now_utc};
use crate::{tasks, SqliteStore, StoreError};

const COMMENT_SELECT: &str = "SELECT c.id, c.task_id, c.comment, c.created_at, \
     u.id, u.first_name, u.last_name, u.email \
     FROM task_comments c LEFT JOIN users u ON u.id = c.user_id";

fn comment_from_row(r: &Row<'_>) -> rusqlite::Result<CommentRecord> {
    let id: i64 = r.get(0)?;
    let task: i64 = r.get(1)?;
    let bad_id = |idx: usize, e: taskboard_model::ValidationError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    };
    Ok(CommentRecord {
        id: CommentId::new(id).map_err(|e| bad_id(0, e))?,
        task_id: TaskId::new(task).map_err(|e| bad_id(1, e))?,
        comment: r.get(2)?,
        created_at: row::timestamp(r, 3)?,
        author: row::user_summary_opt(r, 4)?,
    })
}

fn find(conn: &Connection, id: CommentId) -> Result<CommentRecord, StoreError> {
    Ok(conn.query_row(
        &format!("{COMMENT_SELECT} WHERE c.id = ?1"),
        params![id.get()],
        comment_from_row,
    )?)
}

impl SqliteStore {
    pub fn add_comment(
        &self,
        task: TaskId,
        author: UserId,
        text: &str,
    ) -> Result<CommentRecord, StoreError> {
        self.with_conn(|conn| {
            if !tasks::exists(conn, task)? {
                return Err(StoreError::NotFound("task"));
            }
            conn.execute(
                "INSERT INTO task_comments (task_id, user_id, comment, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![task.get(), author.get(), text, format_timestamp(&now_utc())],
            )?;
            let id = CommentId::new(conn.last_insert_rowid())
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            find(conn, id)
        })
    }

    /// Oldest first.
    pub fn comments_for_task(&self, task: TaskId) -> Result<Vec<CommentRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{COMMENT_SELECT} WHERE c.task_id = ?1 ORDER BY c.created_at, c.id"
            ))?;
            let rows = stmt.query_map(params![task.get()], comment_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }
}
