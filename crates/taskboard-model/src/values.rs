// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const EMAIL_MAX_LEN: usize = 254;
pub const NAME_MAX_LEN: usize = 100;
pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 4000;
pub const COMMENT_MAX_LEN: usize = 2000;
pub const ICON_MAX_BYTES: usize = 8;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 128;

/// Login identity. Stored and compared lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ValidationError("email must not be empty".to_string()));
        }
        if s.len() > EMAIL_MAX_LEN {
            return Err(ValidationError(format!(
                "email exceeds max length {EMAIL_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError(
                "email must not contain whitespace".to_string(),
            ));
        }
        let Some((local, domain)) = s.split_once('@') else {
            return Err(ValidationError("email must contain '@'".to_string()));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ValidationError(
                "email must have exactly one '@' between non-empty parts".to_string(),
            ));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(ValidationError(
                "email domain must be a dotted host name".to_string(),
            ));
        }
        Ok(Self(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// First or last name of a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("name must not be empty".to_string()));
        }
        if s.chars().count() > NAME_MAX_LEN {
            return Err(ValidationError(format!(
                "name exceeds max length {NAME_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError(
                "name must not contain control characters".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PersonName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PersonName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

/// Short project badge, typically a single emoji.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Icon(String);

impl Icon {
    /// Blank input means "no icon".
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("icon must not be empty".to_string()));
        }
        if s.len() > ICON_MAX_BYTES {
            return Err(ValidationError(format!(
                "icon exceeds {ICON_MAX_BYTES} bytes"
            )));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Icon {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Icon> for String {
    fn from(value: Icon) -> Self {
        value.0
    }
}

fn bounded_text(field: &str, input: &str, max: usize) -> Result<String, ValidationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(ValidationError(format!("{field} must not be empty")));
    }
    if s.chars().count() > max {
        return Err(ValidationError(format!(
            "{field} exceeds max length {max}"
        )));
    }
    Ok(s.to_string())
}

pub fn validate_project_name(input: &str) -> Result<String, ValidationError> {
    bounded_text("project name", input, TITLE_MAX_LEN)
}

pub fn validate_task_title(input: &str) -> Result<String, ValidationError> {
    bounded_text("task title", input, TITLE_MAX_LEN)
}

pub fn validate_comment(input: &str) -> Result<String, ValidationError> {
    bounded_text("comment", input, COMMENT_MAX_LEN)
}

/// Descriptions are optional; blank collapses to `None`.
pub fn validate_description(input: Option<&str>) -> Result<Option<String>, ValidationError> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.chars().count() > DESCRIPTION_MAX_LEN => Err(ValidationError(format!(
            "description exceeds max length {DESCRIPTION_MAX_LEN}"
        ))),
        Some(s) => Ok(Some(s.to_string())),
    }
}

/// Passwords are never trimmed.
pub fn validate_password(input: &str) -> Result<(), ValidationError> {
    let len = input.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ValidationError(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ValidationError(format!(
            "password exceeds max length {PASSWORD_MAX_LEN}"
        )));
    }
    Ok(())
}
