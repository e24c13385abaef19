//! Smoke tests for the service surface: health, metrics, docs, and the
//! login rate limiter.

use gate_core::axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use workflow_tests::spawn_app;

#[tokio::test]
async fn health_answers_ok() {
    let app = spawn_app();
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn metrics_endpoint_is_open() {
    let app = spawn_app();
    let (status, _) = app.get("/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = spawn_app();
    let (status, doc) = app.get("/.well-known/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/gate/submit"].is_object());
}

#[tokio::test]
async fn swagger_routes_get_the_relaxed_csp() {
    let app = spawn_app();

    let docs = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/.well-known/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let csp = docs
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(csp.contains("script-src 'self' 'unsafe-inline'"));

    // everything else keeps the strict policy
    let health = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let csp = health
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(csp, "default-src 'none'; frame-ancestors 'none'");
}

#[tokio::test]
async fn unparseable_json_is_a_bad_request() {
    let app = spawn_app();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_logins_from_one_ip_are_throttled() {
    let app = spawn_app();

    // the test config allows 3 login attempts per window
    let mut last_status = StatusCode::OK;
    for _ in 0..4 {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from(
                json!({"username": "emmanuel", "password": "wrong"}).to_string(),
            ))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        last_status = response.status();
    }

    assert_eq!(last_status, StatusCode::TOO_MANY_REQUESTS);
}
