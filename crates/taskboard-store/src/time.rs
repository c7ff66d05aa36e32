// SPDX-License-Identifier: Apache-2.0

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::StoreError;

/// Wire and storage shape of every timestamp, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current UTC time truncated to whole seconds.
#[must_use]
pub fn now_utc() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

#[must_use]
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| StoreError::Corrupt(format!("timestamp `{raw}`: {e}")))
}
