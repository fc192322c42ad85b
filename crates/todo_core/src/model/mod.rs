//! To-do domain model.
//!
//! # Responsibility
//! - Define the item record and the id-keyed collection.
//! - Own the wire shape of the persisted collection blob.
//!
//! # Invariants
//! - Every item is identified by a stable `TodoId`.
//! - Deletion removes the entry; there are no tombstones.

pub mod collection;
pub mod todo;
