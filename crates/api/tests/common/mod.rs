#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use todos_api::config::{CorsOrigins, LogFormat, ServerConfig, StoreBackend};
use todos_api::router::build_app_router;
use todos_api::state::AppState;
use todos_core::todo::NewTodo;
use todos_db::{MemoryTodoRepo, TodoRepo};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:4200` as the only CORS origin, the in-memory store
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: CorsOrigins::parse("http://localhost:4200").unwrap(),
        request_timeout_secs: 30,
        path_base: None,
        store: StoreBackend::InMemory,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over `repo`, with every middleware layer
/// production uses.
pub fn build_test_app_with(repo: Arc<MemoryTodoRepo>, config: ServerConfig) -> Router {
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub fn build_test_app(repo: Arc<MemoryTodoRepo>) -> Router {
    build_test_app_with(repo, test_config())
}

/// A repository holding the three reference todos (ids 1, 2, 3), none completed.
pub async fn seeded_repo() -> Arc<MemoryTodoRepo> {
    let repo = Arc::new(MemoryTodoRepo::new());
    let now = Utc::now();
    let seed = [
        (1, "Add DB", "Set up the database", 1),
        (2, "Create API", "Create REST API", 2),
        (3, "Create APP", "Create SPA to access the API", 3),
    ];
    for (id, title, description, due_in_days) in seed {
        repo.create(&NewTodo {
            id: Some(id),
            title: title.to_string(),
            description: Some(description.to_string()),
            due_date: Some(now + Duration::days(due_in_days)),
            is_completed: Some(false),
        })
        .await
        .unwrap();
    }
    repo
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_raw(app, method, uri, body.to_string()).await
}

pub async fn send_raw(app: &Router, method: Method, uri: &str, body: String) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn patch_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
