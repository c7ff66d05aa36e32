// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 210_000;
pub const MIN_PBKDF2_ITERATIONS: u32 = 1_000;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_BYTES: usize = 16;
const HASH_BYTES: usize = 32;

#[must_use]
pub fn hash_password(plain: &str) -> String {
    hash_password_with(plain, DEFAULT_PBKDF2_ITERATIONS)
}

/// Encodes as `pbkdf2-sha256$<iterations>$<salt>$<hash>` (unpadded base64).
#[must_use]
pub fn hash_password_with(plain: &str, iterations: u32) -> String {
    let iterations = iterations.max(MIN_PBKDF2_ITERATIONS);
    let mut salt = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut out = [0_u8; HASH_BYTES];
    pbkdf2_hmac::<Sha256>(plain.as_bytes(), &salt, iterations, &mut out);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(out)
    )
}

/// Malformed encodings never verify.
#[must_use]
pub fn verify_password(plain: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations < MIN_PBKDF2_ITERATIONS {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (
        STANDARD_NO_PAD.decode(salt),
        STANDARD_NO_PAD.decode(expected),
    ) else {
        return false;
    };
    if expected.len() != HASH_BYTES {
        return false;
    }
    let mut actual = [0_u8; HASH_BYTES];
    pbkdf2_hmac::<Sha256>(plain.as_bytes(), &salt, iterations, &mut actual);
    bool::from(actual.ct_eq(expected.as_slice()))
}
