// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use taskboard_server::{
    build_router, seed_admin, validate_startup_config, AppState, RateLimitConfig, ServerConfig,
};
use taskboard_store::SqliteStore;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_list(name: &str, default: &[String]) -> Vec<String> {
    match env::var(name) {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        Err(_) => default.to_vec(),
    }
}

fn config_from_env() -> ServerConfig {
    let d = ServerConfig::default();
    ServerConfig {
        bind_addr: env_string("TASKBOARD_BIND", &d.bind_addr),
        db_path: env::var("TASKBOARD_DB_PATH").map_or(d.db_path, PathBuf::from),
        jwt_secret: env::var("TASKBOARD_JWT_SECRET").unwrap_or_default(),
        jwt_ttl_secs: env_u64("TASKBOARD_JWT_TTL_SECS", d.jwt_ttl_secs),
        totp_issuer: env_string("TASKBOARD_TOTP_ISSUER", &d.totp_issuer),
        cors_allowed_origins: env_list("TASKBOARD_CORS_ORIGINS", &d.cors_allowed_origins),
        max_body_bytes: env_usize("TASKBOARD_MAX_BODY_BYTES", d.max_body_bytes),
        request_timeout: env_duration_ms(
            "TASKBOARD_REQUEST_TIMEOUT_MS",
            u64::try_from(d.request_timeout.as_millis()).unwrap_or(10_000),
        ),
        auth_rate_limit: RateLimitConfig {
            capacity: env_f64("TASKBOARD_AUTH_RATE_CAPACITY", d.auth_rate_limit.capacity),
            refill_per_sec: env_f64(
                "TASKBOARD_AUTH_RATE_REFILL_PER_SEC",
                d.auth_rate_limit.refill_per_sec,
            ),
        },
        password_iterations: u32::try_from(env_u64(
            "TASKBOARD_PASSWORD_ITERATIONS",
            u64::from(d.password_iterations),
        ))
        .unwrap_or(d.password_iterations),
        enable_audit_log: env_bool("TASKBOARD_AUDIT_LOG", d.enable_audit_log),
        seed_admin: env_bool("TASKBOARD_SEED_ADMIN", d.seed_admin),
        admin_email: env_string("TASKBOARD_ADMIN_EMAIL", &d.admin_email),
        admin_password: env_string("TASKBOARD_ADMIN_PASSWORD", &d.admin_password),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TASKBOARD_LOG_JSON", true) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let cfg = config_from_env();
    validate_startup_config(&cfg)?;
    info!(config = ?cfg, "starting taskboard-server");

    let store = SqliteStore::open(&cfg.db_path).map_err(|e| format!("open store: {e}"))?;
    let version = store.migrate().map_err(|e| format!("migrate: {e}"))?;
    info!(schema_version = version, db = %cfg.db_path.display(), "store ready");

    let bind_addr = cfg.bind_addr.clone();
    let state = AppState::new(store, cfg);
    match seed_admin(&state).await {
        Ok(true) => info!(email = %state.config.admin_email, "admin account seeded"),
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "admin seeding failed");
            return Err(format!("seed admin: {e}"));
        }
    }
    state.ready.store(true, Ordering::Relaxed);

    let app = build_router(state.clone());
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr}: {e}"))?;
    info!(addr = %bind_addr, "listening");

    let ready = state.ready.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            ready.store(false, Ordering::Relaxed);
            info!("shutdown signal received, draining");
        })
        .await
        .map_err(|e| format!("server: {e}"))?;
    info!("taskboard-server stopped");
    Ok(())
}
