//! Integration tests for health probes and response headers.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, empty_request, send, test_config};
use tower::ServiceExt;

#[tokio::test]
async fn test_health_with_memory_store() {
    let (app, _) = create_test_app(test_config());

    let (status, body) = send(&app, empty_request(Method::GET, "/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["configured"], true);
    assert_eq!(body["store"]["connected"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, _) = send(&app, empty_request(Method::GET, "/api/health/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_and_security_headers() {
    let (app, _) = create_test_app(test_config());

    let mut request = empty_request(Method::GET, "/api/health/live", None);
    request
        .headers_mut()
        .insert("x-request-id", "door-1-scan-42".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("x-request-id").unwrap(), "door-1-scan-42");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = create_test_app(test_config());
    let (status, _) = send(&app, empty_request(Method::GET, "/api/v1/nope", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
