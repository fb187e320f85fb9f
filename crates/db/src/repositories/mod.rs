//! Repository layer.
//!
//! [`TodoRepo`] is object safe so the HTTP layer can hold an
//! `Arc<dyn TodoRepo>` and stay unaware of which backend was configured.

pub mod memory_todo_repo;
pub mod todo_repo;

use async_trait::async_trait;
use todos_core::todo::{NewTodo, Todo, TodoFilter};
use todos_core::types::DbId;

pub use memory_todo_repo::MemoryTodoRepo;
pub use todo_repo::PgTodoRepo;

/// Failures surfaced by a [`TodoRepo`]. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An explicit id collided with an existing row.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Persistence operations for todos.
#[async_trait]
pub trait TodoRepo: Send + Sync {
    /// Every todo matching `filter`, ordered by id.
    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<Todo>, StoreError>;

    /// Insert a todo, assigning `created_at` and (unless given) `id`.
    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError>;

    /// Persist the mutable fields of an existing todo.
    ///
    /// Returns `false` if no row with `todo.id` exists.
    async fn update(&self, todo: &Todo) -> Result<bool, StoreError>;

    /// Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
