// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! SQLite persistence.
//!
//! A single [`SqliteStore`] owns one connection behind a mutex. Every
//! operation is synchronous; async callers are expected to move calls onto
//! a blocking thread.

mod comments;
mod error;
mod members;
mod projects;
mod records;
mod row;
mod schema;
mod tasks;
mod time;
mod users;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub use error::StoreError;
pub use records::{
    CommentRecord, MemberRecord, NewProject, NewTask, NewUser, ProjectPatch, ProjectRecord,
    TaskPatch, TaskRecord, UserRecord, UserSummary,
};
pub use schema::SCHEMA_VERSION;
pub use time::{format_timestamp, now_utc, parse_timestamp, TIMESTAMP_FORMAT};

pub const CRATE_NAME: &str = "taskboard-store";

pub const IN_MEMORY_PATH: &str = ":memory:";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens (creating if needed) a database file. `:memory:` opens a
    /// private in-memory database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.as_os_str() == IN_MEMORY_PATH {
            return Self::open_in_memory();
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA busy_timeout=5000;
            ",
        )?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Applies pending migrations and returns the resulting version.
    pub fn migrate(&self) -> Result<i64, StoreError> {
        self.with_conn(schema::migrate)
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| schema::current_version(conn))
    }

    /// Cheap liveness probe used by readiness checks.
    pub fn ping(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))?;
            Ok(())
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| StoreError::Sqlite("connection mutex poisoned".to_string()))?;
        f(&mut guard)
    }
}
