//! Common test utilities for integration tests.
//!
//! The app runs against the in-memory ticket store, so these tests need no
//! external services.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use persistence::{InMemoryTicketStore, TicketStore};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use ticket_desk_api::{app::create_app, config::Config};
use tower::ServiceExt;

pub const TEST_PIN: &str = "2823";
pub const TEST_SECRET: &str = "integration_test_session_secret_0123456789";
pub const PUBLIC_BASE_URL: &str = "https://tickets.example.com";

/// Argon2 hash of [`TEST_PIN`], computed once per test binary.
pub fn test_pin_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| shared::pin::hash_pin(TEST_PIN).expect("Failed to hash test PIN"))
}

/// Configuration for an app backed by the in-memory store with operator auth enabled.
pub fn test_config() -> Config {
    test_config_with(&[])
}

pub fn test_config_with(overrides: &[(&str, &str)]) -> Config {
    let mut all = vec![
        ("database.url", "memory://"),
        ("auth.admin_pin_hash", test_pin_hash()),
        ("auth.session_secret", TEST_SECRET),
        ("server.public_base_url", PUBLIC_BASE_URL),
    ];
    all.extend_from_slice(overrides);
    Config::load_for_test(&all).expect("Failed to load test config")
}

/// Creates an app and returns the store handle so tests can inspect it.
pub fn create_test_app(config: Config) -> (Router, Arc<InMemoryTicketStore>) {
    let store = Arc::new(InMemoryTicketStore::new());
    let app = create_app(config, Some(store.clone() as Arc<dyn TicketStore>));
    (app, store)
}

pub fn json_request(method: Method, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Sends a request and returns the status with the parsed body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, parse_response_body(response).await)
}

/// Logs in as `operator` and returns the bearer token.
pub async fn login(app: &Router, operator: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/auth/session",
            json!({ "pin": TEST_PIN, "operator": operator }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"].as_str().unwrap().to_string()
}

pub fn gala_ticket() -> Value {
    json!({
        "event_name": "Gala",
        "participant_name": "A. Dupont",
        "date": "2025-06-01",
        "time": "19:00",
        "address": "Main Hall"
    })
}

/// Issues a ticket and returns the response body.
pub async fn issue(app: &Router, token: &str, body: Value) -> Value {
    let (status, body) = send(
        app,
        json_request(Method::POST, "/api/v1/tickets", body, Some(token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "issue failed: {}", body);
    body
}

pub async fn scan(app: &Router, token: &str, payload: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/scans",
            json!({ "payload": payload }),
            Some(token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "scan failed: {}", body);
    body
}
