// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP service for taskboard.
//!
//! [`build_router`] wires the REST routes, the `{"error": ...}` envelope and
//! the middleware stack around an [`AppState`]. Handlers never touch SQLite
//! directly on the async runtime; every store call runs on the blocking
//! pool.

mod config;
mod error;
mod http;
mod middleware;
mod rate_limiter;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use taskboard_auth::hash_password_with;
use taskboard_model::{Email, Role};
use taskboard_store::NewUser;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

pub use config::{validate_startup_config, RateLimitConfig, ServerConfig, MIN_JWT_SECRET_BYTES};
pub use error::AppError;
pub use state::AppState;

use crate::http::{admin, auth, comments, health, projects, tasks, users};
use middleware::audit::audit_middleware;
use middleware::request_tracing::request_tracing_middleware;
use middleware::security_headers::security_headers_middleware;

pub const CRATE_NAME: &str = "taskboard-server";

const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

fn cors_layer(cfg: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .max_age(CORS_MAX_AGE);
    // Credentials cannot be combined with wildcards.
    if cfg.cors_allowed_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any).allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    let cfg = Arc::clone(&state.config);
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/api/openapi.json", get(health::openapi))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/2fa/verify", post(auth::verify_two_factor))
        .route("/api/auth/2fa/enable", post(auth::enable_two_factor))
        .route("/api/users/me", get(users::me))
        .route("/api/users", get(users::list))
        .route("/api/admin/change-role", post(admin::change_role))
        .route("/api/admin/users", get(admin::users))
        .route(
            "/api/projects",
            get(projects::created_by_me).post(projects::create),
        )
        .route("/api/projects/my-member-projects", get(projects::member_of))
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/api/projects/:id/members",
            get(projects::members).post(projects::add_member),
        )
        .route(
            "/api/projects/:id/members/:user_id",
            delete(projects::remove_member),
        )
        .route("/api/tasks", post(tasks::create))
        .route("/api/tasks/my", get(tasks::mine))
        .route("/api/tasks/project/:project_id", get(tasks::mine_in_project))
        .route(
            "/api/tasks/project/:project_id/all",
            get(tasks::all_in_project),
        )
        .route(
            "/api/tasks/:id",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route("/api/tasks/:id/details", get(tasks::details))
        .route("/api/tasks/:id/assignee", get(tasks::assignee))
        .route("/api/tasks/:id/to-review", patch(tasks::submit_for_review))
        .route(
            "/api/tasks/:id/comments",
            get(comments::list).post(comments::create),
        )
        .fallback(health::not_found)
        .layer(DefaultBodyLimit::max(cfg.max_body_bytes))
        .layer(from_fn_with_state(state.clone(), audit_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(TimeoutLayer::new(cfg.request_timeout))
        .layer(from_fn_with_state(state.clone(), request_tracing_middleware))
        .layer(cors_layer(&cfg))
        .with_state(state)
}

/// Creates the bootstrap ADMIN account from config unless the email is
/// already registered. Returns whether an account was created.
pub async fn seed_admin(state: &AppState) -> Result<bool, AppError> {
    let cfg = Arc::clone(&state.config);
    if !cfg.seed_admin {
        return Ok(false);
    }
    let email = Email::parse(&cfg.admin_email).map_err(AppError::invalid("adminEmail"))?;
    let existing = email.clone();
    if state
        .db(move |store| store.user_by_email(&existing))
        .await?
        .is_some()
    {
        return Ok(false);
    }
    let password = cfg.admin_password.clone();
    let iterations = cfg.password_iterations;
    let password_hash = state
        .blocking(move || hash_password_with(&password, iterations))
        .await?;
    let admin = NewUser {
        first_name: "Admin".to_string(),
        last_name: "User".to_string(),
        email,
        password_hash,
        role: Role::Admin,
    };
    state.db(move |store| store.ensure_user(&admin)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use taskboard_store::SqliteStore;
    use tower::ServiceExt;

    fn state() -> AppState {
        let store = SqliteStore::open_in_memory().expect("store");
        store.migrate().expect("migrate");
        AppState::new(
            store,
            ServerConfig {
                jwt_secret: "unit-test-secret-unit-test-secret".to_string(),
                password_iterations: taskboard_auth::MIN_PBKDF2_ITERATIONS,
                ..ServerConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn healthz_answers_without_a_listener() {
        let resp = build_router(state())
            .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
        let body = to_bytes(resp.into_body(), 64).await.expect("body");
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let state = state();
        assert!(seed_admin(&state).await.expect("first"));
        assert!(!seed_admin(&state).await.expect("second"));
        let admin = state
            .store
            .user_by_email(&Email::parse("admin@example.com").expect("email"))
            .expect("lookup")
            .expect("admin");
        assert_eq!(admin.role, Role::Admin);
    }
}
