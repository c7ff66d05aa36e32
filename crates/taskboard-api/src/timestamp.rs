// SPDX-License-Identifier: Apache-2.0

//! Serde adapters for timestamps on the wire (`YYYY-MM-DDTHH:MM:SS`, UTC,
//! no offset).

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Accepts the full wire form and the minute-precision form used by
/// `datetime-local` inputs.
pub fn parse_lenient(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, WIRE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, MINUTE_FORMAT))
        .map_err(|_| format!("`{raw}` is not YYYY-MM-DDTHH:MM[:SS]"))
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(WIRE_FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_lenient(&raw).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::{parse_lenient, WIRE_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.collect_str(&v.format(WIRE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Blank strings count as absent.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_lenient(&raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
