//! Row mapping for the `todos` table.

use sqlx::FromRow;
use todos_core::todo::Todo;
use todos_core::types::{DbId, Timestamp};

/// A row from the `todos` table.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub is_completed: Option<bool>,
    pub created_at: Timestamp,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            is_completed: row.is_completed,
            created_at: row.created_at,
        }
    }
}
