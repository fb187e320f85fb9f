//! Tests for the shared middleware stack and the non-todo routes: CORS,
//! request IDs, path base, health and the OpenAPI document.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_json, get, send};
use todos_api::config::CorsOrigins;
use todos_db::MemoryTodoRepo;

fn preflight(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri(uri)
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(Body::empty())
        .unwrap()
}

fn with_origin(uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = common::build_test_app(Arc::new(MemoryTodoRepo::new()));

    let response = send(&app, preflight("/api/todos/1", "http://localhost:4200")).await;
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4200"
    );
}

#[tokio::test]
async fn cors_rejects_unlisted_origin() {
    let app = common::build_test_app(Arc::new(MemoryTodoRepo::new()));

    let response = send(&app, with_origin("/api/todos", "http://evil.test")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn cors_wildcard_subdomains() {
    let mut config = common::test_config();
    config.cors_origins = CorsOrigins::parse("https://*.example.com").unwrap();
    let app = common::build_test_app_with(Arc::new(MemoryTodoRepo::new()), config);

    let response = send(&app, with_origin("/api/todos", "https://app.example.com")).await;
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let response = send(&app, with_origin("/api/todos", "https://example.org")).await;
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn cors_any_origin() {
    let mut config = common::test_config();
    config.cors_origins = CorsOrigins::Any;
    let app = common::build_test_app_with(Arc::new(MemoryTodoRepo::new()), config);

    let response = send(&app, with_origin("/api/todos", "http://anything.test")).await;
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// ---------------------------------------------------------------------------
// Request ID
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_id_is_generated_and_propagated() {
    let app = common::build_test_app(Arc::new(MemoryTodoRepo::new()));

    let response = get(&app, "/health").await;
    assert!(response.headers().get("x-request-id").is_some());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

// ---------------------------------------------------------------------------
// Path base
// ---------------------------------------------------------------------------

#[tokio::test]
async fn path_base_prefixes_every_route() {
    let mut config = common::test_config();
    config.path_base = Some("/todo-app".to_string());
    let app = common::build_test_app_with(common::seeded_repo().await, config);

    let response = get(&app, "/todo-app/api/todos/1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/todos/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::post_json(
        &app,
        "/todo-app/api/todos",
        serde_json::json!({"title": "Based", "dueDate": "2031-01-01T00:00:00Z", "isCompleted": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()[header::LOCATION], "/todo-app/api/todos/4");
}

// ---------------------------------------------------------------------------
// Health and docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok() {
    let app = common::build_test_app(Arc::new(MemoryTodoRepo::new()));

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = common::build_test_app(Arc::new(MemoryTodoRepo::new()));

    let response = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["paths"]["/api/todos"]["get"].is_object());
    assert!(json["paths"]["/api/todos/{id}"]["patch"].is_object());
}
