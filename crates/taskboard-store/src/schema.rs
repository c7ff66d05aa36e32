// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::time::{format_timestamp, now_utc};
use crate::StoreError;

pub const SCHEMA_VERSION: i64 = 1;

const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    "
    CREATE TABLE users (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      first_name TEXT NOT NULL,
      last_name TEXT NOT NULL,
      email TEXT NOT NULL UNIQUE,
      password_hash TEXT NOT NULL,
      role TEXT NOT NULL,
      two_factor_enabled INTEGER NOT NULL DEFAULT 0,
      two_factor_secret TEXT,
      created_at TEXT NOT NULL
    );
    CREATE TABLE projects (
      id TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      description TEXT,
      status TEXT NOT NULL,
      icon TEXT,
      created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
    CREATE INDEX projects_created_by_idx ON projects(created_by);
    CREATE TABLE project_members (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
      user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
      project_role TEXT NOT NULL,
      joined_at TEXT NOT NULL,
      UNIQUE (project_id, user_id)
    );
    CREATE INDEX project_members_user_idx ON project_members(user_id);
    CREATE TABLE tasks (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
      title TEXT NOT NULL,
      description TEXT,
      status TEXT,
      priority TEXT,
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      due_date TEXT,
      created_by INTEGER REFERENCES users(id) ON DELETE SET NULL,
      assigned_to INTEGER REFERENCES users(id) ON DELETE SET NULL
    );
    CREATE INDEX tasks_project_idx ON tasks(project_id);
    CREATE INDEX tasks_assigned_idx ON tasks(assigned_to);
    CREATE TABLE task_comments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
      user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
      comment TEXT NOT NULL,
      created_at TEXT NOT NULL
    );
    CREATE INDEX task_comments_task_idx ON task_comments(task_id);
    ",
)];

fn ensure_migrations_table(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
           version INTEGER PRIMARY KEY,
           applied_at TEXT NOT NULL
         );",
    )?;
    Ok(())
}

pub(crate) fn current_version(conn: &Connection) -> Result<i64, StoreError> {
    ensure_migrations_table(conn)?;
    let version: Option<i64> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .optional()?
        .flatten();
    Ok(version.unwrap_or(0))
}

pub(crate) fn migrate(conn: &mut Connection) -> Result<i64, StoreError> {
    let applied = current_version(conn)?;
    if applied > SCHEMA_VERSION {
        return Err(StoreError::Corrupt(format!(
            "database schema version {applied} is newer than supported {SCHEMA_VERSION}"
        )));
    }
    let mut version = applied;
    for (target, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > applied) {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![target, format_timestamp(&now_utc())],
        )?;
        tx.commit()?;
        info!(version = *target, "applied schema migration");
        version = *target;
    }
    Ok(version)
}
