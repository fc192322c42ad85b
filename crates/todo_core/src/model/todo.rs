//! To-do item domain model.
//!
//! # Responsibility
//! - Define the canonical item record stored in the collection blob.
//! - Generate stable, time-ordered identifiers at creation time.
//!
//! # Invariants
//! - `id` is immutable for the lifetime of an item.
//! - `created_at` is immutable; it is not used for ordering.
//! - A freshly created item has non-empty `text` and `is_completed == false`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Opaque item identifier.
///
/// Generated ids are UUID v7 strings. Ids loaded from an existing blob are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Generates a new time-ordered unique id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Validation errors for item construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyId,
    EmptyText,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "todo id must not be empty"),
            Self::EmptyText => write!(f, "todo text must not be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// One to-do entry.
///
/// Field names on the wire follow the persisted blob schema
/// (`id`, `isCompleted`, `text`, `createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: TodoId,
    pub is_completed: bool,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl TodoItem {
    /// Creates a new, not-yet-completed item with a generated id.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is empty.
    pub fn new(text: impl Into<String>) -> Result<Self, TodoValidationError> {
        Self::with_id(TodoId::generate(), text, now_epoch_ms())
    }

    /// Creates a new item with caller-provided identity and timestamp.
    ///
    /// Used by the state reducer so replaying actions stays deterministic.
    pub fn with_id(
        id: TodoId,
        text: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, TodoValidationError> {
        let item = Self {
            id,
            is_completed: false,
            text: text.into(),
            created_at,
        };
        if item.text.is_empty() {
            return Err(TodoValidationError::EmptyText);
        }
        item.validate()?;
        Ok(item)
    }

    /// Checks invariants that must hold for every stored item.
    ///
    /// Text emptiness is only enforced at creation; edits may clear it.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.id.as_str().is_empty() {
            return Err(TodoValidationError::EmptyId);
        }
        Ok(())
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// Falls back to `0` if the system clock reads earlier than the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
