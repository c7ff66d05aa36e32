// SPDX-License-Identifier: Apache-2.0

mod support;

use serde_json::json;
use support::{call, error_code, login, register, spawn, spawn_with, test_config, PASSWORD};
use taskboard_auth::code_at;
use taskboard_server::RateLimitConfig;

fn secret_from_uri(uri: &str) -> String {
    uri.split(['?', '&'])
        .find_map(|part| part.strip_prefix("secret="))
        .expect("secret param")
        .to_string()
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::test]
async fn register_login_and_profile() {
    let (addr, _) = spawn().await;
    let token = register(addr, "Jan", "Jan@Example.com").await;

    let (status, me) = call("GET", addr, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, 200);
    assert_eq!(me["email"], "jan@example.com");
    assert_eq!(me["firstName"], "Jan");

    let (status, body) = login(addr, "jan@example.com", PASSWORD).await;
    assert_eq!(status, 200);
    assert_eq!(body["requires2FA"], false);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (addr, _) = spawn().await;
    register(addr, "Jan", "jan@example.com").await;
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/register",
        None,
        Some(json!({"firstName": "J", "lastName": "K", "email": "JAN@example.com", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(error_code(&body), "Conflict");
}

#[tokio::test]
async fn registration_validates_fields() {
    let (addr, _) = spawn().await;
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/register",
        None,
        Some(json!({"firstName": "J", "lastName": "K", "email": "no-at-sign", "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["field_errors"][0]["field"], "email");

    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/register",
        None,
        Some(json!({"firstName": "J", "lastName": "K", "email": "j@example.com", "password": "short"})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["field_errors"][0]["field"], "password");
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
    let (addr, _) = spawn().await;
    register(addr, "Jan", "jan@example.com").await;
    let (s1, b1) = login(addr, "jan@example.com", "wrong-password").await;
    let (s2, b2) = login(addr, "ghost@example.com", PASSWORD).await;
    assert_eq!((s1, s2), (401, 401));
    assert_eq!(error_code(&b1), "InvalidCredentials");
    assert_eq!(b1["error"]["message"], b2["error"]["message"]);
}

#[tokio::test]
async fn two_factor_enrolment_changes_login() {
    let (addr, _) = spawn().await;
    let token = register(addr, "Jan", "jan@example.com").await;

    let (status, enrol) = call("POST", addr, "/api/auth/2fa/enable", Some(&token), None).await;
    assert_eq!(status, 200, "{enrol}");
    let qr = enrol["qrCodeImage"].as_str().expect("qr");
    assert!(qr.starts_with("data:image/svg+xml;base64,"));
    let uri = enrol["otpauthUri"].as_str().expect("uri");
    assert!(uri.starts_with("otpauth://totp/Taskboard:"));
    let secret = secret_from_uri(uri);

    let (status, body) = login(addr, "jan@example.com", PASSWORD).await;
    assert_eq!(status, 200);
    assert_eq!(body["requires2FA"], true);
    assert!(body["token"].is_null());

    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/login",
        None,
        Some(json!({"email": "jan@example.com", "password": PASSWORD, "totpCode": "000000x"})),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(error_code(&body), "InvalidCredentials");

    let code = code_at(&secret, now()).expect("code");
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/login",
        None,
        Some(json!({"email": "jan@example.com", "password": PASSWORD, "totpCode": code})),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert!(body["token"].is_string());

    let code = code_at(&secret, now()).expect("code");
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/2fa/verify",
        None,
        Some(json!({"email": "jan@example.com", "totpCode": code})),
    )
    .await;
    assert_eq!(status, 200, "{body}");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn verify_without_enrolment_is_refused() {
    let (addr, _) = spawn().await;
    register(addr, "Jan", "jan@example.com").await;
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/2fa/verify",
        None,
        Some(json!({"email": "jan@example.com", "totpCode": "123456"})),
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(error_code(&body), "InvalidCredentials");
}

#[tokio::test]
async fn login_attempts_are_rate_limited_per_email() {
    let cfg = taskboard_server::ServerConfig {
        auth_rate_limit: RateLimitConfig {
            capacity: 2.0,
            refill_per_sec: 0.01,
        },
        ..test_config()
    };
    let (addr, _) = spawn_with(cfg, true).await;
    for _ in 0..2 {
        let (status, _) = login(addr, "victim@example.com", "guess-guess").await;
        assert_eq!(status, 401);
    }
    let (status, head, body) = support::send_raw(
        "POST",
        addr,
        "/api/auth/login",
        &[("Content-Type", "application/json")],
        br#"{"email":"victim@example.com","password":"guess-guess"}"#,
    )
    .await;
    assert_eq!(status, 429);
    assert!(head.to_ascii_lowercase().contains("retry-after: 100"));
    assert!(body.contains("RateLimited"));

    let (status, _) = login(addr, "other@example.com", "guess-guess").await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn verify_attempts_are_rate_limited_apart_from_login() {
    let cfg = taskboard_server::ServerConfig {
        auth_rate_limit: RateLimitConfig {
            capacity: 2.0,
            refill_per_sec: 0.01,
        },
        ..test_config()
    };
    let (addr, _) = spawn_with(cfg, true).await;
    register(addr, "Jan", "jan@example.com").await;

    let attempt = json!({"email": "jan@example.com", "totpCode": "123456"});
    for _ in 0..2 {
        let (status, _) = call("POST", addr, "/api/auth/2fa/verify", None, Some(attempt.clone())).await;
        assert_eq!(status, 401);
    }
    let (status, head, body) = support::send_raw(
        "POST",
        addr,
        "/api/auth/2fa/verify",
        &[("Content-Type", "application/json")],
        attempt.to_string().as_bytes(),
    )
    .await;
    assert_eq!(status, 429);
    assert!(head.to_ascii_lowercase().contains("retry-after: 100"));
    assert!(body.contains("RateLimited"));

    // The login bucket for the same email is untouched.
    let (status, body) = login(addr, "jan@example.com", PASSWORD).await;
    assert_eq!(status, 200, "{body}");
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn tokens_are_checked_on_every_request() {
    let (addr, state) = spawn().await;
    let token = register(addr, "Jan", "jan@example.com").await;

    let (status, body) = call("GET", addr, "/api/users/me", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(error_code(&body), "Unauthenticated");

    let (status, _) = call("GET", addr, "/api/users/me", Some("a.b.c"), None).await;
    assert_eq!(status, 401);

    let user = state
        .store
        .user_by_email(&taskboard_model::Email::parse("jan@example.com").expect("email"))
        .expect("lookup")
        .expect("user");
    state.store.delete_user(user.id).expect("delete");
    let (status, body) = call("GET", addr, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["details"]["reason"], "unknown account");
}
