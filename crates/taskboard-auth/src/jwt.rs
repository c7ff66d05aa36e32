// SPDX-License-Identifier: Apache-2.0

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskboard_model::{Email, Role, UserId, ValidationError};

use crate::AuthError;

pub const JWT_ALGORITHM: &str = "HS256";

/// Payload of an access token. `role` is the authority string clients
/// branch on (`ROLE_ADMIN`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub uid: i64,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn role(&self) -> Result<Role, ValidationError> {
        Role::from_authority(&self.role)
    }

    pub fn user_id(&self) -> Result<UserId, ValidationError> {
        UserId::new(self.uid)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: UserId,
    pub email: &'a Email,
    pub role: Role,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Issues and checks HS256 compact tokens with a single shared secret.
#[derive(Clone)]
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("secret", &"<redacted>")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl JwtSigner {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: i64) -> Self {
        let secret = secret.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            validation,
            ttl_secs,
        }
    }

    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, subject: &TokenSubject<'_>, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: subject.email.as_str().to_string(),
            uid: subject.user_id.get(),
            role: subject.role.authority().to_string(),
            first_name: subject.first_name.to_string(),
            last_name: subject.last_name.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding, &self.validation)
            .map_err(|e| token_error(e.kind()))?;
        if data.claims.exp <= now {
            return Err(AuthError::Expired);
        }
        Ok(data.claims)
    }
}

fn token_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::UnsupportedAlgorithm
        }
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidToken => AuthError::MalformedToken("expected three segments"),
        ErrorKind::Base64(_) => AuthError::MalformedToken("segment is not base64url"),
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => AuthError::MalformedToken("segment is not json"),
        ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedToken("missing required claim"),
        _ => AuthError::MalformedToken("token rejected"),
    }
}
