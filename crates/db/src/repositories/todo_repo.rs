//! Repository for the `todos` table.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use todos_core::todo::{NewTodo, Todo, TodoFilter};
use todos_core::types::DbId;

use super::{StoreError, TodoRepo};
use crate::models::todo::TodoRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, due_date, is_completed, created_at";

/// PostgreSQL-backed todo repository.
///
/// Every call checks a connection out of the pool for the duration of a
/// single statement (or transaction) and returns it on drop.
#[derive(Debug, Clone)]
pub struct PgTodoRepo {
    pool: PgPool,
}

impl PgTodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepo for PgTodoRepo {
    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, StoreError> {
        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM todos WHERE TRUE"));

        if let Some(needle) = filter.title_contains() {
            // Backslash is the default LIKE escape character in PostgreSQL.
            query
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)));
        }
        if let Some(completed) = filter.completed_equals() {
            query.push(" AND is_completed = ").push_bind(completed);
        }
        query.push(" ORDER BY id");

        let rows = query
            .build_query_as::<TodoRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Todo>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = $1");
        let row = sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Todo::from))
    }

    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError> {
        let row = match input.id {
            None => {
                let query = format!(
                    "INSERT INTO todos (title, description, due_date, is_completed)
                     VALUES ($1, $2, $3, COALESCE($4, FALSE))
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, TodoRow>(&query)
                    .bind(&input.title)
                    .bind(&input.description)
                    .bind(input.due_date)
                    .bind(input.is_completed)
                    .fetch_one(&self.pool)
                    .await?
            }
            Some(id) => {
                let mut tx = self.pool.begin().await?;
                let query = format!(
                    "INSERT INTO todos (id, title, description, due_date, is_completed)
                     VALUES ($1, $2, $3, $4, COALESCE($5, FALSE))
                     RETURNING {COLUMNS}"
                );
                let row = sqlx::query_as::<_, TodoRow>(&query)
                    .bind(id)
                    .bind(&input.title)
                    .bind(&input.description)
                    .bind(input.due_date)
                    .bind(input.is_completed)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|err| classify_insert_error(err, id))?;

                // Keep the sequence ahead of explicitly assigned ids.
                sqlx::query(
                    "SELECT setval(pg_get_serial_sequence('todos', 'id'),
                                   GREATEST((SELECT MAX(id) FROM todos), 1))",
                )
                .execute(&mut *tx)
                .await?;
                tx.commit().await?;
                row
            }
        };

        tracing::debug!(todo_id = row.id, "Inserted todo row");
        Ok(row.into())
    }

    async fn update(&self, todo: &Todo) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE todos SET
                title = $2,
                description = $3,
                due_date = $4,
                is_completed = $5
             WHERE id = $1",
        )
        .bind(todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.due_date)
        .bind(todo.is_completed)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so the needle is matched literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// PostgreSQL unique constraint violation (23505) on insert maps to a conflict.
fn classify_insert_error(err: sqlx::Error, id: DbId) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::Conflict(format!("Todo with id {id} already exists"));
        }
    }
    StoreError::Database(err)
}
