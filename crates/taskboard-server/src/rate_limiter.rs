// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::config::RateLimitConfig;

const MAX_TRACKED_KEYS: usize = 10_000;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Per-key token buckets. Keys are caller chosen, e.g. `login:<email>`.
#[derive(Default)]
pub(crate) struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub(crate) async fn allow(&self, key: &str, cfg: &RateLimitConfig) -> bool {
        self.allow_at(key, cfg, Instant::now()).await
    }

    async fn allow_at(&self, key: &str, cfg: &RateLimitConfig, now: Instant) -> bool {
        let mut lock = self.buckets.lock().await;
        if lock.len() >= MAX_TRACKED_KEYS && !lock.contains_key(key) {
            // Full buckets carry no state worth keeping.
            lock.retain(|_, b| {
                let elapsed = now.duration_since(b.last_refill).as_secs_f64();
                b.tokens + elapsed * cfg.refill_per_sec < cfg.capacity
            });
        }
        let bucket = lock.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: cfg.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + (elapsed * cfg.refill_per_sec)).min(cfg.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Whole seconds until one token is available again.
#[must_use]
pub(crate) fn retry_after_secs(cfg: &RateLimitConfig) -> u64 {
    if cfg.refill_per_sec <= 0.0 {
        return 60;
    }
    (1.0 / cfg.refill_per_sec).ceil().max(1.0) as u64
}
