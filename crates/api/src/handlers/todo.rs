//! Handlers for the `/todos` resource.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::Json;
use todos_core::error::CoreError;
use todos_core::todo::{
    CreateTodoRequest, NewTodo, PatchTodoRequest, Todo, TodoFilter, TodoResponse,
    UpdateTodoRequest,
};
use todos_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::query::ListTodosParams;
use crate::state::AppState;

/// GET /api/todos
#[utoipa::path(
    get,
    path = "/api/todos",
    params(ListTodosParams),
    responses(
        (status = 200, description = "Todos matching the filters", body = [TodoResponse]),
        (status = 400, description = "Malformed query string")
    ),
    tag = "todos"
)]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListTodosParams>,
) -> AppResult<Json<Vec<TodoResponse>>> {
    let mut filter = TodoFilter::new();
    if let Some(title) = params.title.as_deref() {
        filter = filter.with_title_contains(title);
    }
    if let Some(completed) = params.is_completed {
        filter = filter.with_completed_equals(completed);
    }

    let todos = state.repo.list(&filter).await?;
    Ok(Json(todos.into_iter().map(TodoResponse::from).collect()))
}

/// GET /api/todos/{id}
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 200, description = "The todo", body = TodoResponse),
        (status = 404, description = "No todo with this id")
    ),
    tag = "todos"
)]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TodoResponse>> {
    let todo = find_todo(&state, id).await?;
    Ok(Json(TodoResponse::from(todo)))
}

/// POST /api/todos
///
/// Titles are not validated beyond being present; an empty string is accepted.
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse,
            headers(("Location" = String, description = "URL of the new todo")))
    ),
    tag = "todos"
)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTodoRequest>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<TodoResponse>)> {
    let todo = state.repo.create(&NewTodo::from(input)).await?;
    tracing::info!(todo_id = todo.id, "Todo created");

    let location = format!(
        "{}/api/todos/{}",
        state.config.path_base.as_deref().unwrap_or_default(),
        todo.id
    );
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoResponse::from(todo)),
    ))
}

/// PUT /api/todos/{id}
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 204, description = "Todo replaced"),
        (status = 400, description = "Path id and body id differ"),
        (status = 404, description = "No todo with this id")
    ),
    tag = "todos"
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTodoRequest>,
) -> AppResult<StatusCode> {
    if input.id != id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Path id {id} does not match body id {}",
            input.id
        ))));
    }

    let mut todo = find_todo(&state, id).await?;
    todo.apply_request(&input.fields);
    save_todo(&state, &todo).await?;

    tracing::info!(todo_id = id, "Todo replaced");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/todos/{id}
///
/// The body is read raw so that a missing body (empty or JSON `null`) is a
/// 400 rather than an extractor rejection.
#[utoipa::path(
    patch,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    request_body = PatchTodoRequest,
    responses(
        (status = 204, description = "Todo patched"),
        (status = 400, description = "Missing or malformed body"),
        (status = 404, description = "No todo with this id")
    ),
    tag = "todos"
)]
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<StatusCode> {
    let patch = parse_patch_body(&body)?;

    let mut todo = find_todo(&state, id).await?;
    todo.apply_patch(&patch);
    save_todo(&state, &todo).await?;

    tracing::info!(todo_id = id, "Todo patched");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/todos/{id}
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "Todo id")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 404, description = "No todo with this id")
    ),
    tag = "todos"
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = state.repo.delete(id).await?;
    if deleted {
        tracing::info!(todo_id = id, "Todo deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Todo", id })
}

async fn find_todo(state: &AppState, id: DbId) -> AppResult<Todo> {
    state.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))
}

/// The row can disappear between the read and the write.
async fn save_todo(state: &AppState, todo: &Todo) -> AppResult<()> {
    if state.repo.update(todo).await? {
        Ok(())
    } else {
        Err(not_found(todo.id))
    }
}

fn parse_patch_body(body: &[u8]) -> AppResult<PatchTodoRequest> {
    let missing = || AppError::BadRequest("Request body is required".to_string());

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(missing());
    }

    let patch: Option<PatchTodoRequest> = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid patch body: {e}")))?;
    patch.ok_or_else(missing)
}
