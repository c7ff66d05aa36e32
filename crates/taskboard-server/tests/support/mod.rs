// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use serde_json::{json, Value};
use taskboard_auth::MIN_PBKDF2_ITERATIONS;
use taskboard_model::{Email, Role};
use taskboard_server::{build_router, seed_admin, AppState, RateLimitConfig, ServerConfig};
use taskboard_store::SqliteStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const PASSWORD: &str = "s3cret-pass";

pub fn test_config() -> ServerConfig {
    ServerConfig {
        jwt_secret: "integration-secret-integration-secret".to_string(),
        password_iterations: MIN_PBKDF2_ITERATIONS,
        auth_rate_limit: RateLimitConfig {
            capacity: 100.0,
            refill_per_sec: 100.0,
        },
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        ..ServerConfig::default()
    }
}

pub async fn spawn_with(cfg: ServerConfig, ready: bool) -> (SocketAddr, AppState) {
    let store = SqliteStore::open_in_memory().expect("open store");
    store.migrate().expect("migrate");
    let state = AppState::new(store, cfg);
    seed_admin(&state).await.expect("seed admin");
    state.ready.store(ready, Ordering::Relaxed);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, state)
}

pub async fn spawn() -> (SocketAddr, AppState) {
    spawn_with(test_config(), true).await
}

pub async fn send_raw(
    method: &str,
    addr: SocketAddr,
    path: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    stream.write_all(body).await.expect("write body");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

/// JSON request with an optional bearer token; returns status and parsed body
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn call(
    method: &str,
    addr: SocketAddr,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let auth = token.map(|t| format!("Bearer {t}"));
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", "application/json")];
    if let Some(auth) = auth.as_deref() {
        headers.push(("Authorization", auth));
    }
    let raw = body.map(|b| b.to_string()).unwrap_or_default();
    let (status, _, text) = send_raw(method, addr, path, &headers, raw.as_bytes()).await;
    (status, serde_json::from_str(&text).unwrap_or(Value::Null))
}

pub async fn register(addr: SocketAddr, first: &str, email: &str) -> String {
    let (status, body) = call(
        "POST",
        addr,
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": first,
            "lastName": "Tester",
            "email": email,
            "password": PASSWORD,
        })),
    )
    .await;
    assert_eq!(status, 200, "register {email}: {body}");
    body["token"].as_str().expect("token").to_string()
}

pub async fn login(addr: SocketAddr, email: &str, password: &str) -> (u16, Value) {
    call(
        "POST",
        addr,
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await
}

pub async fn admin_token(addr: SocketAddr) -> String {
    let (status, body) = login(addr, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, 200, "admin login: {body}");
    body["token"].as_str().expect("token").to_string()
}

/// Registers a user, promotes it to MANAGER directly in the store and logs
/// in again so the token carries the new role.
pub async fn manager_token(addr: SocketAddr, state: &AppState, email: &str) -> String {
    register(addr, "Mona", email).await;
    state
        .store
        .set_role(&Email::parse(email).expect("email"), Role::Manager)
        .expect("promote");
    let (status, body) = login(addr, email, PASSWORD).await;
    assert_eq!(status, 200, "manager login: {body}");
    body["token"].as_str().expect("token").to_string()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}
