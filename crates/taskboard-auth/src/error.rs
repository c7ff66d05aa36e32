// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("malformed token: {0}")]
    MalformedToken(&'static str),

    #[error("token algorithm is not HS256")]
    UnsupportedAlgorithm,

    #[error("token signature mismatch")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("signing key rejected: {0}")]
    Key(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("invalid totp secret")]
    InvalidSecret,

    #[error("qr rendering failed: {0}")]
    Qr(String),
}
