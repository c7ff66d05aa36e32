// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Credential primitives.
//!
//! Nothing in here touches storage or HTTP: callers hand in the secret
//! material and the current time, which keeps every function
//! deterministic under test.

mod error;
mod jwt;
mod password;
mod totp;

pub use error::AuthError;
pub use jwt::{Claims, JwtSigner, TokenSubject, JWT_ALGORITHM};
pub use password::{
    hash_password, hash_password_with, verify_password, DEFAULT_PBKDF2_ITERATIONS,
    MIN_PBKDF2_ITERATIONS,
};
pub use totp::{
    code_at, generate_secret, provisioning_uri, qr_data_uri, verify_code, TOTP_DIGITS,
    TOTP_PERIOD_SECS, TOTP_SKEW_STEPS,
};

pub const CRATE_NAME: &str = "taskboard-auth";
