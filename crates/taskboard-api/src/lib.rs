// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Wire contract of the taskboard REST API.
//!
//! Everything here is plain data: request and response bodies in camelCase
//! JSON, the `{"error": ...}` envelope and the OpenAPI document. Storage
//! records are mapped into these types by the server.

mod error_mapping;
mod errors;
mod openapi;
mod requests;
mod responses;
pub mod timestamp;

pub use error_mapping::{map_error, ApiErrorMapping, API_ERROR_SCHEMA_REF};
pub use errors::{ApiError, ApiErrorCode, ApiErrorEnvelope, UNKNOWN_REQUEST_ID};
pub use openapi::{openapi_v1_spec, ApiRoute, API_ROUTES};
pub use requests::{
    AddProjectMemberRequest, ChangeRoleRequest, CreateCommentRequest, CreateProjectRequest,
    CreateTaskRequest, LoginRequest, RegisterRequest, TotpRequest, UpdateProjectRequest,
    UpdateTaskRequest,
};
pub use responses::{
    AuthResponse, ProjectMemberEntry, ProjectMemberResponse, ProjectResponse,
    TaskAssigneeDetailsResponse, TaskCommentResponse, TaskDetailsResponse, TaskResponse,
    TaskWithAssigneeResponse, UserBasicInfo, UserResponse, UserSummary,
};

pub const CRATE_NAME: &str = "taskboard-api";
pub const ROLE_UPDATED_MESSAGE: &str = "User role updated successfully";
