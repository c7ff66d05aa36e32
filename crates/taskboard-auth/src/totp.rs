// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use qrcode::render::svg;
use qrcode::QrCode;
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;

use crate::AuthError;

pub const TOTP_PERIOD_SECS: i64 = 30;
pub const TOTP_DIGITS: usize = 6;
pub const TOTP_SKEW_STEPS: i64 = 1;

const SECRET_BYTES: usize = 20;
const QR_MIN_DIMENSION: u32 = 200;

type HmacSha1 = Hmac<Sha1>;

/// Fresh base32 secret suitable for authenticator apps.
#[must_use]
pub fn generate_secret() -> String {
    let mut raw = [0_u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut raw);
    BASE32_NOPAD.encode(&raw)
}

fn decode_secret(secret: &str) -> Result<Vec<u8>, AuthError> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(AuthError::InvalidSecret);
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|_| AuthError::InvalidSecret)
}

fn code_for_step(key: &[u8], step: u64) -> Result<String, AuthError> {
    let mut mac = HmacSha1::new_from_slice(key).map_err(|e| AuthError::Key(e.to_string()))?;
    mac.update(&step.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);
    let modulus = 10_u32.pow(TOTP_DIGITS as u32);
    Ok(format!("{:0width$}", binary % modulus, width = TOTP_DIGITS))
}

/// Code for the step containing `unix_secs`.
pub fn code_at(secret: &str, unix_secs: i64) -> Result<String, AuthError> {
    let key = decode_secret(secret)?;
    let step = u64::try_from(unix_secs.div_euclid(TOTP_PERIOD_SECS))
        .map_err(|_| AuthError::Encoding("time before unix epoch".to_string()))?;
    code_for_step(&key, step)
}

/// Accepts the current step and `TOTP_SKEW_STEPS` either side.
#[must_use]
pub fn verify_code(secret: &str, code: &str, unix_secs: i64) -> bool {
    let code = code.trim();
    if code.len() != TOTP_DIGITS || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(key) = decode_secret(secret) else {
        return false;
    };
    let current = unix_secs.div_euclid(TOTP_PERIOD_SECS);
    let mut matched = false;
    for delta in -TOTP_SKEW_STEPS..=TOTP_SKEW_STEPS {
        let Ok(step) = u64::try_from(current + delta) else {
            continue;
        };
        let Ok(expected) = code_for_step(&key, step) else {
            return false;
        };
        matched |= bool::from(expected.as_bytes().ct_eq(code.as_bytes()));
    }
    matched
}

#[must_use]
pub fn provisioning_uri(secret: &str, account: &str, issuer: &str) -> String {
    let issuer_enc = utf8_percent_encode(issuer, NON_ALPHANUMERIC).to_string();
    let account_enc = utf8_percent_encode(account, NON_ALPHANUMERIC).to_string();
    format!(
        "otpauth://totp/{issuer_enc}:{account_enc}?secret={secret}&issuer={issuer_enc}&algorithm=SHA1&digits={TOTP_DIGITS}&period={TOTP_PERIOD_SECS}"
    )
}

/// Renders `uri` as an SVG QR code wrapped in a `data:` URI.
pub fn qr_data_uri(uri: &str) -> Result<String, AuthError> {
    let code = QrCode::new(uri.as_bytes()).map_err(|e| AuthError::Qr(e.to_string()))?;
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image.as_bytes())
    ))
}
