// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::time::Duration;

use taskboard_auth::{DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};

/// Shortest accepted HS256 key.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub capacity: f64,
    pub refill_per_sec: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5.0,
            refill_per_sec: 0.2,
        }
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub totp_issuer: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub auth_rate_limit: RateLimitConfig,
    pub password_iterations: u32,
    pub enable_audit_log: bool,
    pub seed_admin: bool,
    pub admin_email: String,
    pub admin_password: String,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("totp_issuer", &self.totp_issuer)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout", &self.request_timeout)
            .field("auth_rate_limit", &self.auth_rate_limit)
            .field("password_iterations", &self.password_iterations)
            .field("enable_audit_log", &self.enable_audit_log)
            .field("seed_admin", &self.seed_admin)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: PathBuf::from("taskboard.sqlite"),
            jwt_secret: String::new(),
            jwt_ttl_secs: 86_400,
            totp_issuer: "Taskboard".to_string(),
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
            max_body_bytes: 64 * 1024,
            request_timeout: Duration::from_secs(10),
            auth_rate_limit: RateLimitConfig::default(),
            password_iterations: DEFAULT_PBKDF2_ITERATIONS,
            enable_audit_log: false,
            seed_admin: true,
            admin_email: "admin@example.com".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

pub fn validate_startup_config(cfg: &ServerConfig) -> Result<(), String> {
    if cfg.jwt_secret.trim().is_empty() {
        return Err("TASKBOARD_JWT_SECRET must be set".to_string());
    }
    if cfg.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
        return Err(format!(
            "jwt secret must be at least {MIN_JWT_SECRET_BYTES} bytes"
        ));
    }
    if cfg.jwt_ttl_secs == 0 {
        return Err("jwt ttl must be > 0".to_string());
    }
    if cfg.max_body_bytes == 0 {
        return Err("max body bytes must be > 0".to_string());
    }
    if cfg.request_timeout.is_zero() {
        return Err("request timeout must be > 0".to_string());
    }
    if cfg.auth_rate_limit.capacity < 1.0 || cfg.auth_rate_limit.refill_per_sec <= 0.0 {
        return Err("auth rate limit requires capacity >= 1 and refill > 0".to_string());
    }
    if cfg.password_iterations < MIN_PBKDF2_ITERATIONS {
        return Err(format!(
            "password iterations must be >= {MIN_PBKDF2_ITERATIONS}"
        ));
    }
    if cfg.totp_issuer.trim().is_empty() {
        return Err("totp issuer must not be empty".to_string());
    }
    if cfg.seed_admin && (cfg.admin_email.trim().is_empty() || cfg.admin_password.is_empty()) {
        return Err("seed_admin=true requires admin email and password".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServerConfig {
        ServerConfig {
            jwt_secret: "x".repeat(MIN_JWT_SECRET_BYTES),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn defaults_with_secret_are_valid() {
        validate_startup_config(&valid()).expect("valid");
    }

    #[test]
    fn rejects_missing_and_short_secrets() {
        let err = validate_startup_config(&ServerConfig::default()).expect_err("empty");
        assert!(err.contains("JWT_SECRET"));
        let short = ServerConfig {
            jwt_secret: "short".to_string(),
            ..ServerConfig::default()
        };
        let err = validate_startup_config(&short).expect_err("short");
        assert!(err.contains("at least"));
    }

    #[test]
    fn rejects_zero_limits_and_timeouts() {
        let cfg = ServerConfig {
            max_body_bytes: 0,
            ..valid()
        };
        assert!(validate_startup_config(&cfg).is_err());
        let cfg = ServerConfig {
            request_timeout: Duration::ZERO,
            ..valid()
        };
        assert!(validate_startup_config(&cfg)
            .expect_err("timeout")
            .contains("timeout"));
        let cfg = ServerConfig {
            auth_rate_limit: RateLimitConfig {
                capacity: 0.0,
                refill_per_sec: 1.0,
            },
            ..valid()
        };
        assert!(validate_startup_config(&cfg).is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains(&"x".repeat(MIN_JWT_SECRET_BYTES)));
        assert!(!rendered.contains("admin123"));
    }
}
