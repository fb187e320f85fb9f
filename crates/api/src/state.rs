use std::sync::Arc;

use todos_db::TodoRepo;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Todo store selected at startup (PostgreSQL or in-memory).
    pub repo: Arc<dyn TodoRepo>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
