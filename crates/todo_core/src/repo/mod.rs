//! Persistence adapter layer.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the store.
//! - Isolate SQLite and blob-format details from state management.
//!
//! # Invariants
//! - The whole collection lives in one blob under `TODO_LIST_KEY`.
//! - Undecodable blobs are reported as errors, never silently truncated.

pub mod blob_codec;
pub mod kv_repo;
