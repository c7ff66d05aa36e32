// SPDX-License-Identifier: Apache-2.0

mod support;

use serde_json::Value;
use support::{send_raw, spawn, spawn_with, test_config};
use taskboard_server::ServerConfig;

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

#[tokio::test]
async fn health_and_readiness() {
    let (addr, state) = spawn_with(test_config(), false).await;
    let (status, _, body) = send_raw("GET", addr, "/healthz", &[], b"").await;
    assert_eq!((status, body.as_str()), (200, "ok"));

    let (status, head, body) = send_raw("GET", addr, "/readyz", &[], b"").await;
    assert_eq!(status, 503);
    assert!(header(&head, "retry-after").is_some());
    assert!(body.contains("NotReady"));

    state
        .ready
        .store(true, std::sync::atomic::Ordering::Relaxed);
    let (status, _, body) = send_raw("GET", addr, "/readyz", &[], b"").await;
    assert_eq!((status, body.as_str()), (200, "ready"));
}

#[tokio::test]
async fn errors_echo_the_request_id() {
    let (addr, _) = spawn().await;
    let (status, head, body) = send_raw(
        "GET",
        addr,
        "/api/users/me",
        &[("x-request-id", "client-abc-123")],
        b"",
    )
    .await;
    assert_eq!(status, 401);
    assert_eq!(header(&head, "x-request-id"), Some("client-abc-123"));
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["requestId"], "client-abc-123");
    assert_eq!(json["error"]["code"], "Unauthenticated");

    let (_, head, body) = send_raw("GET", addr, "/api/users/me", &[], b"").await;
    let generated = header(&head, "x-request-id").expect("generated id");
    assert!(generated.starts_with("req-"));
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["requestId"], generated);
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let (addr, _) = spawn().await;
    let (status, _, body) = send_raw("GET", addr, "/api/nope", &[], b"").await;
    assert_eq!(status, 404);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["details"]["entity"], "route");
}

#[tokio::test]
async fn wrong_method_uses_the_error_envelope() {
    let (addr, _) = spawn().await;
    let (status, head, body) = send_raw(
        "DELETE",
        addr,
        "/api/users/me",
        &[("x-request-id", "req-method")],
        b"",
    )
    .await;
    assert_eq!(status, 405);
    assert!(header(&head, "content-type").is_some_and(|v| v.starts_with("application/json")));
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["code"], "MethodNotAllowed");
    assert_eq!(json["error"]["requestId"], "req-method");
}

#[tokio::test]
async fn slow_requests_time_out_with_the_error_envelope() {
    let cfg = ServerConfig {
        request_timeout: std::time::Duration::from_millis(1),
        password_iterations: 5_000_000,
        seed_admin: false,
        ..test_config()
    };
    let (addr, _) = spawn_with(cfg, true).await;
    let (status, _, body) = send_raw(
        "POST",
        addr,
        "/api/auth/register",
        &[("Content-Type", "application/json")],
        br#"{"firstName":"Jan","lastName":"K","email":"slow@example.com","password":"s3cret-pass"}"#,
    )
    .await;
    assert_eq!(status, 408);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["code"], "Timeout");
    assert_eq!(json["error"]["details"]["limit_ms"], 1);
    assert!(json["error"]["requestId"].as_str().is_some_and(|id| id.starts_with("req-")));
}

#[tokio::test]
async fn security_headers_are_always_present() {
    let (addr, _) = spawn().await;
    for path in ["/healthz", "/api/users/me"] {
        let (_, head, _) = send_raw("GET", addr, path, &[], b"").await;
        assert_eq!(header(&head, "x-content-type-options"), Some("nosniff"));
        assert_eq!(header(&head, "x-frame-options"), Some("SAMEORIGIN"));
    }
}

#[tokio::test]
async fn malformed_and_oversized_bodies() {
    let cfg = ServerConfig {
        max_body_bytes: 256,
        ..test_config()
    };
    let (addr, _) = spawn_with(cfg, true).await;
    let json_ct = [("Content-Type", "application/json")];

    let (status, _, body) = send_raw("POST", addr, "/api/auth/login", &json_ct, b"{not json").await;
    assert_eq!(status, 400);
    assert!(body.contains("ValidationFailed"));

    let big = format!(
        r#"{{"email":"a@example.com","password":"{}"}}"#,
        "x".repeat(1024)
    );
    let (status, _, body) = send_raw("POST", addr, "/api/auth/login", &json_ct, big.as_bytes()).await;
    assert_eq!(status, 413);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"]["code"], "PayloadTooLarge");
    assert_eq!(json["error"]["details"]["limit_bytes"], 256);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let (addr, _) = spawn().await;
    let (status, head, _) = send_raw(
        "OPTIONS",
        addr,
        "/api/projects",
        &[
            ("Origin", "http://localhost:5173"),
            ("Access-Control-Request-Method", "POST"),
            ("Access-Control-Request-Headers", "authorization,content-type"),
        ],
        b"",
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        header(&head, "access-control-allow-origin"),
        Some("http://localhost:5173")
    );
    assert_eq!(header(&head, "access-control-allow-credentials"), Some("true"));

    let (_, head, _) = send_raw(
        "OPTIONS",
        addr,
        "/api/projects",
        &[
            ("Origin", "http://evil.example"),
            ("Access-Control-Request-Method", "POST"),
        ],
        b"",
    )
    .await;
    assert!(header(&head, "access-control-allow-origin").is_none());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (addr, _) = spawn().await;
    let (status, _, body) = send_raw("GET", addr, "/api/openapi.json", &[], b"").await;
    assert_eq!(status, 200);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["openapi"], "3.0.3");
    assert!(json["paths"]["/api/tasks/{id}/to-review"]["patch"].is_object());
}
