//! OpenAPI documentation.
//!
//! [`ApiDoc`] is served as JSON at `/api-docs/openapi.json` and rendered by
//! Swagger UI at `/swagger-ui`.

use utoipa::OpenApi;

use crate::routes::health::HealthResponse;
use todos_core::todo::{CreateTodoRequest, PatchTodoRequest, TodoResponse, UpdateTodoRequest};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todos API",
        description = "CRUD endpoints for todo items."
    ),
    paths(
        crate::handlers::todo::list,
        crate::handlers::todo::get_by_id,
        crate::handlers::todo::create,
        crate::handlers::todo::update,
        crate::handlers::todo::patch,
        crate::handlers::todo::delete,
        crate::routes::health::health_check,
    ),
    components(schemas(
        TodoResponse,
        CreateTodoRequest,
        UpdateTodoRequest,
        PatchTodoRequest,
        HealthResponse
    )),
    tags(
        (name = "todos", description = "Todo items"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
