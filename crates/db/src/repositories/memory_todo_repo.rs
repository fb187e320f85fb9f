//! Transient in-memory todo repository.
//!
//! Selected with `USE_IN_MEMORY=true`. Contents are lost on restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use todos_core::todo::{NewTodo, Todo, TodoFilter};
use todos_core::types::DbId;

use super::{StoreError, TodoRepo};

/// In-memory todo repository with the same semantics as [`super::PgTodoRepo`].
#[derive(Debug)]
pub struct MemoryTodoRepo {
    state: RwLock<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    rows: BTreeMap<DbId, Todo>,
    /// Next id handed out when the caller does not supply one.
    next_id: DbId,
}

impl MemoryTodoRepo {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored todos.
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryTodoRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TodoRepo for MemoryTodoRepo {
    async fn list(&self, filter: &TodoFilter) -> Result<Vec<Todo>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Todo>, StoreError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, input: &NewTodo) -> Result<Todo, StoreError> {
        let mut state = self.state.write().await;

        let id = input.id.unwrap_or(state.next_id);
        if state.rows.contains_key(&id) {
            return Err(StoreError::Conflict(format!(
                "Todo with id {id} already exists"
            )));
        }
        state.next_id = state.next_id.max(id.saturating_add(1));

        let todo = Todo {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            due_date: input.due_date,
            is_completed: Some(input.is_completed.unwrap_or(false)),
            created_at: Utc::now(),
        };
        state.rows.insert(id, todo.clone());

        tracing::debug!(todo_id = id, "Inserted in-memory todo");
        Ok(todo)
    }

    async fn update(&self, todo: &Todo) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.rows.get_mut(&todo.id) {
            Some(existing) => {
                existing.title = todo.title.clone();
                existing.description = todo.description.clone();
                existing.due_date = todo.due_date;
                existing.is_completed = todo.is_completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.state.write().await.rows.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
