//! Query parameter types for API handlers.

use serde::Deserialize;
use utoipa::IntoParams;

/// Filters for `GET /api/todos` (`?title=&isCompleted=`).
///
/// Both are optional and compose with AND. A blank `title` is ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTodosParams {
    /// Case-insensitive substring of the title; surrounding whitespace is trimmed.
    pub title: Option<String>,
    /// Exact match on the completion flag.
    pub is_completed: Option<bool>,
}
