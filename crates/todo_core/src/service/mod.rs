//! Core state services.
//!
//! # Responsibility
//! - Turn user operations into state transitions and snapshot writes.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod persist_queue;
pub mod state;
pub mod todo_store;
