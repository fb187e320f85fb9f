//! Todo entity, wire shapes and the mapping layer between them.
//!
//! The store only ever sees [`Todo`] and [`NewTodo`]; handlers only ever
//! send [`TodoResponse`]. Every conversion between the two worlds lives here
//! and is side-effect free.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::types::{DbId, Timestamp};

/// A persisted todo item.
///
/// `id` and `created_at` are assigned by the store and never change after
/// creation. The entity itself accepts any title, including an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct Todo {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub is_completed: Option<bool>,
    pub created_at: Timestamp,
}

/// A todo that has not been persisted yet.
///
/// `id` is normally `None` so the store assigns one; an explicit id is
/// honoured (seeding, full-request mapping). `created_at` is never carried.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    /// Stored as `false` when omitted.
    pub is_completed: Option<bool>,
}

/// Body of `POST /api/todos`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    #[schema(value_type = String, format = DateTime)]
    pub due_date: Timestamp,
    pub is_completed: bool,
}

/// Body of `PUT /api/todos/{id}`: a full replacement plus the target id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    #[schema(value_type = i64)]
    pub id: DbId,
    #[serde(flatten)]
    pub fields: CreateTodoRequest,
}

/// Body of `PATCH /api/todos/{id}`.
///
/// Only non-null values are written. A missing key and an explicit `null`
/// both leave the stored attribute unchanged, so a patch can never clear a
/// field; use a full update for that.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatchTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Timestamp>,
    pub is_completed: Option<bool>,
}

/// A todo as returned over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    #[schema(value_type = i64)]
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub due_date: Option<Timestamp>,
    pub is_completed: Option<bool>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
}

/// Parse an ISO-8601 timestamp.
///
/// Values with an offset are converted to UTC. Values without one (a bare
/// date or a local date-time) are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

fn deserialize_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

impl From<&Todo> for TodoResponse {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            due_date: todo.due_date,
            is_completed: todo.is_completed,
            created_at: todo.created_at,
        }
    }
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            due_date: todo.due_date,
            is_completed: todo.is_completed,
            created_at: todo.created_at,
        }
    }
}

impl From<CreateTodoRequest> for NewTodo {
    fn from(request: CreateTodoRequest) -> Self {
        Self {
            id: None,
            title: request.title,
            description: request.description,
            due_date: Some(request.due_date),
            is_completed: Some(request.is_completed),
        }
    }
}

impl UpdateTodoRequest {
    /// Build a new todo from the replacement fields, keeping the request id.
    pub fn to_domain(&self) -> NewTodo {
        NewTodo {
            id: Some(self.id),
            ..NewTodo::from(self.fields.clone())
        }
    }
}

impl Todo {
    /// Overwrite every mutable field from a full request.
    ///
    /// `id` and `created_at` are left untouched.
    pub fn apply_request(&mut self, request: &CreateTodoRequest) {
        self.title = request.title.clone();
        self.description = request.description.clone();
        self.due_date = Some(request.due_date);
        self.is_completed = Some(request.is_completed);
    }

    /// Overwrite only the fields present in `patch`.
    pub fn apply_patch(&mut self, patch: &PatchTodoRequest) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = Some(is_completed);
        }
    }

    /// Like [`Todo::apply_patch`], but a missing patch is a no-op.
    pub fn apply_patch_opt(&mut self, patch: Option<&PatchTodoRequest>) {
        if let Some(patch) = patch {
            self.apply_patch(patch);
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Filter for listing todos. Conditions compose with AND; an empty filter
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    title_contains: Option<String>,
    completed_equals: Option<bool>,
}

impl TodoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on the title.
    ///
    /// The needle is trimmed; a blank needle leaves the filter unchanged.
    pub fn with_title_contains(mut self, needle: &str) -> Self {
        let needle = needle.trim();
        if !needle.is_empty() {
            self.title_contains = Some(needle.to_string());
        }
        self
    }

    /// Exact match on the completion flag. Rows with a `NULL` flag never match.
    pub fn with_completed_equals(mut self, completed: bool) -> Self {
        self.completed_equals = Some(completed);
        self
    }

    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    pub fn completed_equals(&self) -> Option<bool> {
        self.completed_equals
    }

    /// Evaluate the filter against a single todo.
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(needle) = &self.title_contains {
            if !todo.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(completed) = self.completed_equals {
            if todo.is_completed != Some(completed) {
                return false;
            }
        }
        true
    }
}
