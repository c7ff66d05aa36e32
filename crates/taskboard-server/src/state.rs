// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use taskboard_auth::JwtSigner;
use taskboard_store::{SqliteStore, StoreError};

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::rate_limiter::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SqliteStore>,
    pub signer: Arc<JwtSigner>,
    pub config: Arc<ServerConfig>,
    pub ready: Arc<AtomicBool>,
    pub(crate) auth_limiter: Arc<RateLimiter>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// The state starts not-ready; `main` flips it after seeding.
    #[must_use]
    pub fn new(store: SqliteStore, config: ServerConfig) -> Self {
        let ttl = i64::try_from(config.jwt_ttl_secs).unwrap_or(i64::MAX);
        let signer = JwtSigner::new(config.jwt_secret.as_bytes().to_vec(), ttl);
        Self {
            store: Arc::new(store),
            signer: Arc::new(signer),
            config: Arc::new(config),
            ready: Arc::new(AtomicBool::new(false)),
            auth_limiter: Arc::new(RateLimiter::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Runs a store call on the blocking pool.
    pub(crate) async fn db<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| AppError::Internal(format!("store task: {e}")))?
            .map_err(AppError::from)
    }

    /// Runs CPU-heavy work (password hashing) on the blocking pool.
    pub(crate) async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| AppError::Internal(format!("blocking task: {e}")))
    }
}

#[must_use]
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
