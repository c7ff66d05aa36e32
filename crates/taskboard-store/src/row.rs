// SPDX-License-Identifier: Apache-2.0

//! Column decoding helpers. Failures surface as
//! `FromSqlConversionFailure`, which `StoreError` reports as `Corrupt`.

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::Row;
use std::str::FromStr;
use taskboard_model::{Email, UserId};

use crate::records::UserSummary;
use crate::time::TIMESTAMP_FORMAT;

fn conversion<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| conversion(idx, e))
}

pub(crate) fn parsed_opt<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| s.parse::<T>().map_err(|e| conversion(idx, e)))
        .transpose()
}

pub(crate) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| conversion(idx, e))
}

pub(crate) fn timestamp_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(|e| conversion(idx, e)))
        .transpose()
}

pub(crate) fn user_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<UserId> {
    let raw: i64 = row.get(idx)?;
    UserId::new(raw).map_err(|e| conversion(idx, e))
}

pub(crate) fn email(row: &Row<'_>, idx: usize) -> rusqlite::Result<Email> {
    let raw: String = row.get(idx)?;
    Email::parse(&raw).map_err(|e| conversion(idx, e))
}

/// Reads an optional user summary from four consecutive columns
/// `(id, first_name, last_name, email)`, as produced by a LEFT JOIN.
pub(crate) fn user_summary_opt(
    row: &Row<'_>,
    start: usize,
) -> rusqlite::Result<Option<UserSummary>> {
    let id: Option<i64> = row.get(start)?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(UserSummary {
        id: UserId::new(id).map_err(|e| conversion(start, e))?,
        first_name: row.get(start + 1)?,
        last_name: row.get(start + 2)?,
        email: email(row, start + 3)?,
    }))
}

pub(crate) fn user_summary(row: &Row<'_>, start: usize) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: user_id(row, start)?,
        first_name: row.get(start + 1)?,
        last_name: row.get(start + 2)?,
        email: email(row, start + 3)?,
    })
}

pub(crate) fn icon_opt(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<taskboard_model::Icon>> {
    let raw: Option<String> = row.get(idx)?;
    taskboard_model::Icon::parse_optional(raw.as_deref()).map_err(|e| conversion(idx, e))
}
