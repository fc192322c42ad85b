//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the to-do store to Dart via FRB as an opaque session handle.
//! - Keep error semantics simple: envelopes and plain strings, no panics.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The Dart side owns the `TodoSession`; no process-wide store exists.
//! - Item ids cross the boundary as UTF-8 strings.

use flutter_rust_bridge::frb;
use log::warn;
use std::sync::{Mutex, MutexGuard, PoisonError};
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    SqliteKeyValueStore, TodoId, TodoItem, TodoStore,
};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Row rendered by the to-do list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl From<&TodoItem> for TodoItemView {
    fn from(item: &TodoItem) -> Self {
        Self {
            id: item.id.to_string(),
            text: item.text.clone(),
            is_completed: item.is_completed,
            created_at: item.created_at,
        }
    }
}

/// Generic action response envelope for list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    /// Whether the operation changed the list.
    pub ok: bool,
    /// Affected item ID, when one exists.
    pub todo_id: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl TodoActionResponse {
    fn success(message: impl Into<String>, todo_id: String) -> Self {
        Self {
            ok: true,
            todo_id: Some(todo_id),
            message: message.into(),
        }
    }

    fn noop(message: impl Into<String>, todo_id: Option<String>) -> Self {
        Self {
            ok: false,
            todo_id,
            message: message.into(),
        }
    }
}

/// One open to-do screen backed by a SQLite file.
///
/// Opaque to Dart; the owning widget keeps it alive for the screen lifetime.
#[frb(opaque)]
pub struct TodoSession {
    store: Mutex<TodoStore>,
}

impl TodoSession {
    /// Opens the database at `db_path` and loads the persisted list.
    ///
    /// # FFI contract
    /// - Sync call; performs file I/O once.
    /// - A corrupt or unreadable list yields an empty, usable session.
    /// - Returns an error string only when the database cannot be opened.
    #[frb(sync)]
    pub fn open(db_path: String) -> Result<TodoSession, String> {
        let trimmed = db_path.trim();
        if trimmed.is_empty() {
            return Err("db_path cannot be empty".to_string());
        }
        let adapter = SqliteKeyValueStore::open(trimmed)
            .map_err(|err| format!("todo DB open failed: {err}"))?;
        let mut store =
            TodoStore::new(adapter).map_err(|err| format!("todo store init failed: {err}"))?;
        store.load();
        Ok(Self {
            store: Mutex::new(store),
        })
    }

    #[frb(sync)]
    pub fn is_loading(&self) -> bool {
        self.lock().is_loading()
    }

    #[frb(sync)]
    pub fn pending_text(&self) -> String {
        self.lock().pending_text().to_string()
    }

    #[frb(sync)]
    pub fn set_pending_text(&self, text: String) {
        self.lock().set_pending_text(text);
    }

    /// Items in display order (most recently added first).
    #[frb(sync)]
    pub fn list(&self) -> Vec<TodoItemView> {
        self.lock()
            .display_order()
            .into_iter()
            .map(TodoItemView::from)
            .collect()
    }

    /// Commits the pending text as a new item.
    #[frb(sync)]
    pub fn add(&self) -> TodoActionResponse {
        match self.lock().add_todo() {
            Some(id) => TodoActionResponse::success("Todo added.", id.to_string()),
            None => TodoActionResponse::noop("Nothing to add.", None),
        }
    }

    #[frb(sync)]
    pub fn delete(&self, id: String) -> TodoActionResponse {
        self.apply(id, "Todo deleted.", |store, id| store.delete_todo(id))
    }

    #[frb(sync)]
    pub fn complete(&self, id: String) -> TodoActionResponse {
        self.apply(id, "Todo completed.", |store, id| store.complete_todo(id))
    }

    #[frb(sync)]
    pub fn uncomplete(&self, id: String) -> TodoActionResponse {
        self.apply(id, "Todo reopened.", |store, id| store.uncomplete_todo(id))
    }

    #[frb(sync)]
    pub fn toggle(&self, id: String) -> TodoActionResponse {
        self.apply(id, "Todo toggled.", |store, id| store.toggle_todo(id))
    }

    #[frb(sync)]
    pub fn update_text(&self, id: String, text: String) -> TodoActionResponse {
        self.apply(id, "Todo updated.", move |store, id| store.update_text(id, text))
    }

    /// Waits for queued writes; call before the app is suspended.
    #[frb(sync)]
    pub fn flush(&self) {
        self.lock().flush();
    }

    fn apply(
        &self,
        id: String,
        message: &str,
        f: impl FnOnce(&mut TodoStore, &TodoId),
    ) -> TodoActionResponse {
        let id = TodoId::from(id);
        let mut store = self.lock();
        let found = store.get(&id).is_some();
        f(&mut *store, &id);
        if found {
            TodoActionResponse::success(message, id.to_string())
        } else {
            TodoActionResponse::noop("Todo not found.", Some(id.to_string()))
        }
    }

    fn lock(&self) -> MutexGuard<'_, TodoStore> {
        self.store.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("event=ffi_session module=ffi status=recovered reason=lock_poisoned");
            poisoned.into_inner()
        })
    }
}
