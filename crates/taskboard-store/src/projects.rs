// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskboard_model::{ProjectId, UserId};

use crate::records::{NewProject, ProjectPatch, ProjectRecord};
use crate::row;
use crate::time::{format_timestamp, now_utc};
use crate::{users, SqliteStore, StoreError};

const PROJECT_SELECT: &str = "SELECT p.id, p.name, p.description, p.status, p.icon, \
     p.created_at, p.updated_at, u.id, u.first_name, u.last_name, u.email \
     FROM projects p LEFT JOIN users u ON u.id = p.created_by";

fn project_from_row(r: &Row<'_>) -> rusqlite::Result<ProjectRecord> {
    Ok(ProjectRecord {
        id: row::parsed(r, 0)?,
        name: r.get(1)?,
        description: r.get(2)?,
        status: row::parsed(r, 3)?,
        icon: row::icon_opt(r, 4)?,
        created_at: row::timestamp(r, 5)?,
        updated_at: row::timestamp(r, 6)?,
        created_by: row::user_summary_opt(r, 7)?,
    })
}

pub(crate) fn find(conn: &Connection, id: ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
    Ok(conn
        .query_row(
            &format!("{PROJECT_SELECT} WHERE p.id = ?1"),
            params![id.to_string()],
            project_from_row,
        )
        .optional()?)
}

pub(crate) fn exists(conn: &Connection, id: ProjectId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM projects WHERE id = ?1",
            params![id.to_string()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn query_projects(
    conn: &Connection,
    sql: &str,
    user: UserId,
) -> Result<Vec<ProjectRecord>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![user.get()], project_from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl SqliteStore {
    pub fn create_project(&self, project: &NewProject) -> Result<ProjectRecord, StoreError> {
        self.with_conn(|conn| {
            if !users::exists(conn, project.created_by)? {
                return Err(StoreError::NotFound("user"));
            }
            let id = ProjectId::generate();
            let now = format_timestamp(&now_utc());
            conn.execute(
                "INSERT INTO projects (id, name, description, status, icon, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id.to_string(),
                    project.name,
                    project.description,
                    project.status.as_str(),
                    project.icon.as_ref().map(|i| i.as_str()),
                    project.created_by.get(),
                    now,
                ],
            )?;
            find(conn, id)?.ok_or(StoreError::NotFound("project"))
        })
    }

    pub fn project_by_id(&self, id: ProjectId) -> Result<Option<ProjectRecord>, StoreError> {
        self.with_conn(|conn| find(conn, id))
    }

    pub fn projects_created_by(&self, user: UserId) -> Result<Vec<ProjectRecord>, StoreError> {
        self.with_conn(|conn| {
            query_projects(
                conn,
                &format!("{PROJECT_SELECT} WHERE p.created_by = ?1 ORDER BY p.created_at, p.rowid"),
                user,
            )
        })
    }

    /// Projects the user belongs to as a member, each listed once.
    pub fn projects_with_member(&self, user: UserId) -> Result<Vec<ProjectRecord>, StoreError> {
        self.with_conn(|conn| {
            query_projects(
                conn,
                &format!(
                    "{PROJECT_SELECT} WHERE EXISTS (
                       SELECT 1 FROM project_members m WHERE m.project_id = p.id AND m.user_id = ?1
                     ) ORDER BY p.created_at, p.rowid"
                ),
                user,
            )
        })
    }

    pub fn update_project(
        &self,
        id: ProjectId,
        patch: &ProjectPatch,
    ) -> Result<ProjectRecord, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE projects
                 SET name = ?1, description = ?2, status = ?3, icon = COALESCE(?4, icon), updated_at = ?5
                 WHERE id = ?6",
                params![
                    patch.name,
                    patch.description,
                    patch.status.as_str(),
                    patch.icon.as_ref().map(|i| i.as_str()),
                    format_timestamp(&now_utc()),
                    id.to_string(),
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound("project"));
            }
            find(conn, id)?.ok_or(StoreError::NotFound("project"))
        })
    }

    /// Members, tasks and their comments go with the project.
    pub fn delete_project(&self, id: ProjectId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM projects WHERE id = ?1", params![id.to_string()])?;
            if changed == 0 {
                return Err(StoreError::NotFound("project"));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::NewUser;
    use taskboard_model::{Email, Icon, ProjectStatus, Role};

    fn seeded() -> (SqliteStore, UserId) {
        let store = SqliteStore::open_in_memory().expect("open");
        store.migrate().expect("migrate");
        let user = store
            .create_user(&NewUser {
                first_name: "Mia".to_string(),
                last_name: "Manager".to_string(),
                email: Email::parse("mia@example.com").expect("email"),
                password_hash: "h".to_string(),
                role: Role::Manager,
            })
            .expect("user");
        (store, user.id)
    }

    fn new_project(owner: UserId, name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: Some("desc".to_string()),
            status: ProjectStatus::New,
            icon: Icon::parse_optional(Some("🚀")).expect("icon"),
            created_by: owner,
        }
    }

    #[test]
    fn create_then_load_carries_creator() {
        let (store, owner) = seeded();
        let created = store.create_project(&new_project(owner, "Apollo")).expect("create");
        let loaded = store.project_by_id(created.id).expect("load").expect("some");
        assert_eq!(loaded, created);
        assert_eq!(loaded.created_by.expect("creator").email.as_str(), "mia@example.com");
        assert_eq!(loaded.icon.expect("icon").as_str(), "🚀");
    }

    #[test]
    fn update_keeps_icon_when_absent() {
        let (store, owner) = seeded();
        let created = store.create_project(&new_project(owner, "Apollo")).expect("create");
        let updated = store
            .update_project(
                created.id,
                &ProjectPatch {
                    name: "Artemis".to_string(),
                    description: None,
                    status: ProjectStatus::InProgress,
                    icon: None,
                },
            )
            .expect("update");
        assert_eq!(updated.name, "Artemis");
        assert_eq!(updated.description, None);
        assert_eq!(updated.status, ProjectStatus::InProgress);
        assert!(updated.icon.is_some());
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn missing_project_update_and_delete_are_not_found() {
        let (store, _) = seeded();
        let ghost = ProjectId::generate();
        assert_eq!(store.delete_project(ghost), Err(StoreError::NotFound("project")));
        let patch = ProjectPatch {
            name: "x".to_string(),
            description: None,
            status: ProjectStatus::New,
            icon: None,
        };
        assert_eq!(
            store.update_project(ghost, &patch),
            Err(StoreError::NotFound("project"))
        );
    }

    #[test]
    fn created_by_lists_only_own_projects_in_creation_order() {
        let (store, owner) = seeded();
        let a = store.create_project(&new_project(owner, "A")).expect("a");
        let b = store.create_project(&new_project(owner, "B")).expect("b");
        let listed: Vec<_> = store
            .projects_created_by(owner)
            .expect("list")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, vec![a.id, b.id]);
    }
}
