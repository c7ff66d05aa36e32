// SPDX-License-Identifier: Apache-2.0

use rusqlite::{params, Connection, OptionalExtension, Row};
use taskboard_model::{Email, Role, UserId};
use tracing::info;

use crate::error::conflict_on_unique;
use crate::records::{NewUser, UserRecord};
use crate::row;
use crate::time::{format_timestamp, now_utc};
use crate::{SqliteStore, StoreError};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role, \
     two_factor_enabled, two_factor_secret, created_at";

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row::user_id(r, 0)?,
        first_name: r.get(1)?,
        last_name: r.get(2)?,
        email: row::email(r, 3)?,
        password_hash: r.get(4)?,
        role: row::parsed(r, 5)?,
        two_factor_enabled: r.get(6)?,
        two_factor_secret: r.get(7)?,
        created_at: row::timestamp(r, 8)?,
    })
}

pub(crate) fn find_by_email(
    conn: &Connection,
    email: &Email,
) -> Result<Option<UserRecord>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email.as_str()],
            user_from_row,
        )
        .optional()?)
}

pub(crate) fn find_by_id(conn: &Connection, id: UserId) -> Result<Option<UserRecord>, StoreError> {
    Ok(conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.get()],
            user_from_row,
        )
        .optional()?)
}

pub(crate) fn exists(conn: &Connection, id: UserId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", params![id.get()], |_| {
            Ok(())
        })
        .optional()?
        .is_some())
}

fn insert(conn: &Connection, user: &NewUser) -> Result<UserRecord, StoreError> {
    let created_at = now_utc();
    conn.execute(
        "INSERT INTO users (first_name, last_name, email, password_hash, role, two_factor_enabled, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            user.first_name,
            user.last_name,
            user.email.as_str(),
            user.password_hash,
            user.role.as_str(),
            format_timestamp(&created_at),
        ],
    )
    .map_err(conflict_on_unique("email already registered"))?;
    let id = UserId::new(conn.last_insert_rowid())
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;
    Ok(UserRecord {
        id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        role: user.role,
        two_factor_enabled: false,
        two_factor_secret: None,
        created_at,
    })
}

impl SqliteStore {
    /// Duplicate emails are a `Conflict`.
    pub fn create_user(&self, user: &NewUser) -> Result<UserRecord, StoreError> {
        self.with_conn(|conn| insert(conn, user))
    }

    pub fn user_by_email(&self, email: &Email) -> Result<Option<UserRecord>, StoreError> {
        self.with_conn(|conn| find_by_email(conn, email))
    }

    pub fn user_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.with_conn(|conn| find_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;
            let rows = stmt.query_map([], user_from_row)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    /// Administrator accounts are never re-assigned; the check and the
    /// update are one statement.
    pub fn set_role(&self, email: &Email, role: Role) -> Result<UserRecord, StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?1 WHERE email = ?2 AND role <> ?3",
                params![role.as_str(), email.as_str(), Role::Admin.as_str()],
            )?;
            if changed == 0 {
                return match find_by_email(conn, email)? {
                    Some(_) => Err(StoreError::Conflict(
                        "administrator accounts cannot be re-assigned".to_string(),
                    )),
                    None => Err(StoreError::NotFound("user")),
                };
            }
            find_by_email(conn, email)?.ok_or(StoreError::NotFound("user"))
        })
    }

    /// Stores (or clears, with `None`) the TOTP secret and the enabled flag.
    pub fn set_two_factor(
        &self,
        id: UserId,
        secret: Option<&str>,
        enabled: bool,
    ) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET two_factor_secret = ?1, two_factor_enabled = ?2 WHERE id = ?3",
                params![secret, enabled, id.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound("user"));
            }
            Ok(())
        })
    }

    /// Creates the user unless the email is already taken. Returns whether
    /// a row was inserted; an existing account is left untouched.
    pub fn ensure_user(&self, user: &NewUser) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            if find_by_email(&tx, &user.email)?.is_some() {
                return Ok(false);
            }
            insert(&tx, user)?;
            tx.commit()?;
            info!(email = %user.email, role = %user.role, "seeded account");
            Ok(true)
        })
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.get()])?;
            if changed == 0 {
                return Err(StoreError::NotFound("user"));
            }
            Ok(())
        })
    }
}
