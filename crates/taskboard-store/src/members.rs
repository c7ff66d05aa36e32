// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskboard_model::{MemberId, ProjectId, ProjectRole, UserId};

use crate::error::conflict_on_unique;
use crate::records::MemberRecord;
use crate::row;
use crate::time::{format_timestamp, now_utc};
use crate::{projects, users, SqliteStore, StoreError};

const MEMBER_SELECT: &str = "SELECT m.id, m.project_id, m.project_role, m.joined_at, \
     u.id, u.first_name, u.last_name, u.email \
     FROM project_members m JOIN users u ON u.id = m.user_id";

fn member_from_row(r: &Row<'_>) -> rusqlite::Result<MemberRecord> {
    let id: i64 = r.get(0)?;
    Ok(MemberRecord {
        id: MemberId::new(id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
        })?,
        project_id: row::parsed(r, 1)?,
        project_role: row::parsed(r, 2)?,
        joined_at: row::timestamp(r, 3)?,
        user: row::user_summary(r, 4)?,
    })
}

pub(crate) fn find(
    conn: &Connection,
    project: ProjectId,
    user: UserId,
) -> Result<Option<MemberRecord>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{MEMBER_SELECT} WHERE m.project_id = ?1 AND m.user_id = ?2"),
            params![project.to_string(), user.get()],
            member_from_row,
        )
        .optional()?)
}

impl SqliteStore {
    /// Unknown project or user is `NotFound`; an existing membership is a
    /// `Conflict`.
    pub fn add_member(
        &self,
        project: ProjectId,
        user: UserId,
        role: ProjectRole,
    ) -> Result<MemberRecord, StoreError> {
        self.with_conn(|conn| {
            if !projects::exists(conn, project)? {
                return Err(StoreError::NotFound("project"));
            }
            if !users::exists(conn, user)? {
                return Err(StoreError::NotFound("user"));
            }
            conn.execute(
                "INSERT INTO project_members (project_id, user_id, project_role, joined_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    project.to_string(),
                    user.get(),
                    role.as_str(),
                    format_timestamp(&now_utc()),
                ],
            )
            .map_err(conflict_on_unique("user is already a member of this project"))?;
            find(conn, project, user)?.ok_or(StoreError::NotFound("member"))
        })
    }

    pub fn members_of(&self, project: ProjectId) -> Result<Vec<MemberRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{MEMBER_SELECT} WHERE m.project_id = ?1 ORDER BY m.joined_at, m.id"
            ))?;
            let rows = stmt.query_map(params![project.to_string()], member_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    pub fn membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> Result<Option<MemberRecord>, StoreError> {
        self.with_conn(|conn| find(conn, project, user))
    }

    pub fn remove_member(&self, project: ProjectId, user: UserId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
                params![project.to_string(), user.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound("member"));
            }
            Ok(())
        })
    }
}
