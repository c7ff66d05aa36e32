// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Map, Value};

use crate::{ApiErrorCode, API_ERROR_SCHEMA_REF};

/// Route descriptor: method, OpenAPI path, summary, required role
/// (`None` for public, `Some("")` for any authenticated user).
pub struct ApiRoute {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
    pub role: Option<&'static str>,
    pub ok_status: u16,
}

const ANY: Option<&str> = Some("");

macro_rules! route {
    ($method:literal, $path:literal, $summary:literal, $role:expr, $ok:literal) => {
        ApiRoute {
            method: $method,
            path: $path,
            summary: $summary,
            role: $role,
            ok_status: $ok,
        }
    };
}

pub const API_ROUTES: &[ApiRoute] = &[
    route!("get", "/healthz", "Liveness probe", None, 200),
    route!("get", "/readyz", "Readiness probe", None, 200),
    route!("get", "/api/openapi.json", "This document", None, 200),
    route!("post", "/api/auth/register", "Register a USER account", None, 200),
    route!("post", "/api/auth/login", "Password login, second factor when enabled", None, 200),
    route!("post", "/api/auth/2fa/verify", "Complete login with a TOTP code", None, 200),
    route!("post", "/api/auth/2fa/enable", "Enrol the caller in TOTP", ANY, 200),
    route!("get", "/api/users/me", "Caller profile", ANY, 200),
    route!("get", "/api/users", "All users", Some("MANAGER|ADMIN"), 200),
    route!("post", "/api/admin/change-role", "Grant USER or MANAGER", Some("ADMIN"), 200),
    route!("get", "/api/admin/users", "All users with roles", Some("ADMIN"), 200),
    route!("get", "/api/projects", "Projects created by the caller", ANY, 200),
    route!("post", "/api/projects", "Create a project", Some("MANAGER"), 200),
    route!("get", "/api/projects/my-member-projects", "Projects the caller belongs to", ANY, 200),
    route!("get", "/api/projects/{id}", "Project with members", ANY, 200),
    route!("put", "/api/projects/{id}", "Replace project fields", Some("MANAGER"), 200),
    route!("delete", "/api/projects/{id}", "Delete a project and its tasks", Some("MANAGER"), 204),
    route!("get", "/api/projects/{id}/members", "Project members", ANY, 200),
    route!("post", "/api/projects/{id}/members", "Add a member", Some("MANAGER"), 200),
    route!("delete", "/api/projects/{id}/members/{userId}", "Remove a member", Some("MANAGER"), 204),
    route!("post", "/api/tasks", "Create a task", ANY, 200),
    route!("get", "/api/tasks/my", "Tasks assigned to the caller", ANY, 200),
    route!("get", "/api/tasks/project/{projectId}", "Caller's tasks in a project", ANY, 200),
    route!("get", "/api/tasks/project/{projectId}/all", "All tasks in a project", ANY, 200),
    route!("get", "/api/tasks/{id}", "Task with assignee names", ANY, 200),
    route!("put", "/api/tasks/{id}", "Partial task update", ANY, 200),
    route!("delete", "/api/tasks/{id}", "Delete a task", ANY, 204),
    route!("get", "/api/tasks/{id}/details", "Task with creator and assignee", ANY, 200),
    route!("get", "/api/tasks/{id}/assignee", "Task with assignee contact", ANY, 200),
    route!("patch", "/api/tasks/{id}/to-review", "Hand a task off for review", ANY, 200),
    route!("get", "/api/tasks/{id}/comments", "Task comments, oldest first", ANY, 200),
    route!("post", "/api/tasks/{id}/comments", "Comment on a task", ANY, 200),
];

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": API_ERROR_SCHEMA_REF}}}
    })
}

fn operation(route: &ApiRoute) -> Value {
    let mut responses = Map::new();
    responses.insert(
        route.ok_status.to_string(),
        json!({"description": route.summary}),
    );
    if route.method == "post" || route.method == "put" || route.method == "patch" {
        responses.insert("400".to_string(), error_response("validation failed"));
        responses.insert("413".to_string(), error_response("body too large"));
    }
    if route.role.is_some() {
        responses.insert("401".to_string(), error_response("missing or invalid token"));
    }
    if matches!(route.role, Some(r) if !r.is_empty()) {
        responses.insert("403".to_string(), error_response("insufficient role"));
    }
    if route.path.contains('{') {
        responses.insert("404".to_string(), error_response("not found"));
    }
    if route.path == "/api/auth/login" || route.path == "/api/auth/2fa/verify" {
        responses.insert("401".to_string(), error_response("invalid credentials"));
        responses.insert("429".to_string(), error_response("rate limited"));
    }
    if route.path == "/readyz" {
        responses.insert("503".to_string(), error_response("not ready"));
    }

    let mut op = Map::new();
    op.insert("summary".to_string(), json!(route.summary));
    op.insert("responses".to_string(), Value::Object(responses));
    if let Some(role) = route.role {
        op.insert("security".to_string(), json!([{"bearerAuth": []}]));
        if !role.is_empty() {
            op.insert("x-required-role".to_string(), json!(role));
        }
    }
    let params: Vec<Value> = route
        .path
        .split('/')
        .filter_map(|seg| seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
        .map(|name| json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}}))
        .collect();
    if !params.is_empty() {
        op.insert("parameters".to_string(), Value::Array(params));
    }
    Value::Object(op)
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    let mut paths = Map::new();
    for route in API_ROUTES {
        let entry = paths
            .entry(route.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            methods.insert(route.method.to_string(), operation(route));
        }
    }
    let codes: Vec<&str> = ApiErrorCode::ALL.iter().map(|c| c.as_str()).collect();
    json!({
      "openapi": "3.0.3",
      "info": {"title": "taskboard API", "version": "v1"},
      "paths": Value::Object(paths),
      "components": {
        "securitySchemes": {
          "bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}
        },
        "schemas": {
          "ApiErrorCode": {"type": "string", "enum": codes},
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details", "requestId"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "message": {"type": "string"},
              "details": {"type": "object"},
              "requestId": {"type": "string"}
            }
          }
        }
      }
    })
}
