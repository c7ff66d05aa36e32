// SPDX-License-Identifier: Apache-2.0

use rusqlite::ffi;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("sqlite: {0}")]
    Sqlite(String),

    /// A stored value no longer parses into its domain type.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => {
                Self::Corrupt(format!("column {column}: {source}"))
            }
            other => Self::Sqlite(other.to_string()),
        }
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || inner.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Maps a unique-constraint failure to `Conflict(message)`.
pub(crate) fn conflict_on_unique(message: &str) -> impl FnOnce(rusqlite::Error) -> StoreError + '_ {
    move |err| {
        if is_unique_violation(&err) {
            StoreError::Conflict(message.to_string())
        } else {
            StoreError::from(err)
        }
    }
}
