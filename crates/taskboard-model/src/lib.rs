// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Taskboard domain vocabulary.
//!
//! Everything that crosses a crate boundary (store rows, wire DTOs, JWT
//! claims) is expressed in these types so that parsing and validation
//! happen exactly once.
//!
//! ```
//! use taskboard_model::{Role, TaskStatus};
//!
//! assert_eq!(Role::parse(" manager ").unwrap(), Role::Manager);
//! assert_eq!(Role::Admin.authority(), "ROLE_ADMIN");
//! assert_eq!(TaskStatus::ToReview.as_str(), "TO_REVIEW");
//! ```

#[macro_use]
mod enums;
mod ids;
mod roles;
mod status;
mod values;

pub use ids::{CommentId, MemberId, ProjectId, TaskId, UserId};
pub use roles::{ProjectRole, Role};
pub use status::{ProjectStatus, TaskPriority, TaskStatus};
pub use values::{
    validate_comment, validate_description, validate_password, validate_project_name,
    validate_task_title, Email, Icon, PersonName, ValidationError, COMMENT_MAX_LEN,
    DESCRIPTION_MAX_LEN, EMAIL_MAX_LEN, ICON_MAX_BYTES, NAME_MAX_LEN, PASSWORD_MAX_LEN,
    PASSWORD_MIN_LEN, TITLE_MAX_LEN,
};

pub const CRATE_NAME: &str = "taskboard-model";
