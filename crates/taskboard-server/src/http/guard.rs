// SPDX-License-Identifier: Apache-2.0

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use taskboard_auth::AuthError;
use taskboard_model::Role;
use taskboard_store::UserRecord;

use crate::error::AppError;
use crate::state::unix_now;
use crate::AppState;

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = raw.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The caller, freshly loaded from the store. A token for a deleted or
/// re-created account is refused, and role changes apply to the next request.
#[derive(Debug, Clone)]
pub(crate) struct AuthUser(pub UserRecord);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers)
            .ok_or(AppError::Unauthenticated("missing bearer token"))?;
        let claims = state
            .signer
            .verify(token, unix_now())
            .map_err(|err| match err {
                AuthError::Expired => AppError::Unauthenticated("token expired"),
                _ => AppError::Unauthenticated("invalid token"),
            })?;
        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthenticated("invalid token"))?;
        let user = state
            .db(move |store| store.user_by_id(user_id))
            .await?
            .ok_or(AppError::Unauthenticated("unknown account"))?;
        if user.email.as_str() != claims.sub {
            return Err(AppError::Unauthenticated("invalid token"));
        }
        Ok(Self(user))
    }
}

impl AuthUser {
    fn require(&self, allowed: &[Role], label: &'static str) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(label))
        }
    }

    pub(crate) fn require_manager(&self) -> Result<(), AppError> {
        self.require(&[Role::Manager], "MANAGER")
    }

    pub(crate) fn require_admin(&self) -> Result<(), AppError> {
        self.require(&[Role::Admin], "ADMIN")
    }

    pub(crate) fn require_manager_or_admin(&self) -> Result<(), AppError> {
        self.require(&[Role::Manager, Role::Admin], "MANAGER|ADMIN")
    }
}
