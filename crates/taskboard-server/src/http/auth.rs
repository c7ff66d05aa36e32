// SPDX-License-Identifier: Apache-2.0

use axum::extract::State;
use axum::Json;
use taskboard_api::{AuthResponse, LoginRequest, RegisterRequest, TotpRequest};
use taskboard_auth::{
    generate_secret, hash_password_with, provisioning_uri, qr_data_uri, verify_code,
    verify_password, TokenSubject,
};
use taskboard_model::{validate_password, Email, PersonName, Role};
use taskboard_store::{NewUser, UserRecord};
use tracing::{info, warn};

use crate::error::AppError;
use crate::http::extract::ApiJson;
use crate::http::guard::AuthUser;
use crate::rate_limiter::retry_after_secs;
use crate::state::unix_now;
use crate::AppState;

pub(crate) fn issue_token(state: &AppState, user: &UserRecord) -> Result<String, AppError> {
    let subject = TokenSubject {
        user_id: user.id,
        email: &user.email,
        role: user.role,
        first_name: &user.first_name,
        last_name: &user.last_name,
    };
    Ok(state.signer.issue(&subject, unix_now())?)
}

async fn throttle(state: &AppState, scope: &str, email: &Email) -> Result<(), AppError> {
    let cfg = &state.config.auth_rate_limit;
    if state
        .auth_limiter
        .allow(&format!("{scope}:{email}"), cfg)
        .await
    {
        Ok(())
    } else {
        warn!(scope, email = %email, "auth attempt throttled");
        Err(AppError::RateLimited(retry_after_secs(cfg)))
    }
}

async fn lookup(state: &AppState, email: &Email) -> Result<Option<UserRecord>, AppError> {
    let email = email.clone();
    state.db(move |store| store.user_by_email(&email)).await
}

pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let first_name = PersonName::parse(&req.first_name).map_err(AppError::invalid("firstName"))?;
    let last_name = PersonName::parse(&req.last_name).map_err(AppError::invalid("lastName"))?;
    let email = Email::parse(&req.email).map_err(AppError::invalid("email"))?;
    validate_password(&req.password).map_err(AppError::invalid("password"))?;

    let iterations = state.config.password_iterations;
    let password = req.password;
    let password_hash = state
        .blocking(move || hash_password_with(&password, iterations))
        .await?;
    let new_user = NewUser {
        first_name: first_name.into(),
        last_name: last_name.into(),
        email,
        password_hash,
        role: Role::User,
    };
    let user = state.db(move |store| store.create_user(&new_user)).await?;
    info!(user_id = %user.id, "account registered");
    Ok(Json(AuthResponse::token(issue_token(&state, &user)?)))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = Email::parse(&req.email).map_err(AppError::invalid("email"))?;
    throttle(&state, "login", &email).await?;

    let Some(user) = lookup(&state, &email).await? else {
        return Err(AppError::InvalidCredentials);
    };
    let encoded = user.password_hash.clone();
    let password = req.password;
    if !state
        .blocking(move || verify_password(&password, &encoded))
        .await?
    {
        return Err(AppError::InvalidCredentials);
    }

    if user.two_factor_enabled {
        let Some(secret) = user.two_factor_secret.as_deref() else {
            warn!(user_id = %user.id, "2fa enabled without a stored secret");
            return Err(AppError::InvalidCredentials);
        };
        match req.totp_code.as_deref().map(str::trim) {
            None | Some("") => return Ok(Json(AuthResponse::second_factor_required())),
            Some(code) if verify_code(secret, code, unix_now()) => {}
            Some(_) => return Err(AppError::InvalidCredentials),
        }
    }
    Ok(Json(AuthResponse::token(issue_token(&state, &user)?)))
}

pub(crate) async fn verify_two_factor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TotpRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = Email::parse(&req.email).map_err(AppError::invalid("email"))?;
    throttle(&state, "verify", &email).await?;

    let Some(user) = lookup(&state, &email).await? else {
        return Err(AppError::InvalidCredentials);
    };
    let Some(secret) = user.two_factor_secret.clone() else {
        return Err(AppError::InvalidCredentials);
    };
    if !verify_code(&secret, &req.totp_code, unix_now()) {
        return Err(AppError::InvalidCredentials);
    }
    if !user.two_factor_enabled {
        let id = user.id;
        state
            .db(move |store| store.set_two_factor(id, Some(&secret), true))
            .await?;
    }
    Ok(Json(AuthResponse::token(issue_token(&state, &user)?)))
}

/// Replaces any previous secret; the old authenticator entry stops working.
pub(crate) async fn enable_two_factor(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AuthResponse>, AppError> {
    let secret = generate_secret();
    let uri = provisioning_uri(&secret, user.email.as_str(), &state.config.totp_issuer);
    let qr = qr_data_uri(&uri)?;
    let id = user.id;
    state
        .db(move |store| store.set_two_factor(id, Some(&secret), true))
        .await?;
    info!(user_id = %id, "2fa enrolled");
    Ok(Json(AuthResponse::enrolment(qr, uri)))
}
