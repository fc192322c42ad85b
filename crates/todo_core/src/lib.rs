//! Core state and persistence for the to-do app.
//! This crate is the single source of truth for to-do invariants; the UI shell
//! only renders `AppState` and forwards user events.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::TodoCollection;
pub use model::todo::{now_epoch_ms, TodoId, TodoItem, TodoValidationError};
pub use repo::blob_codec::{decode_collection, encode_collection, BlobError, TODO_LIST_KEY};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use service::persist_queue::PersistQueue;
pub use service::state::{reduce, replay, Action, AppState, Transition};
pub use service::todo_store::TodoStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
