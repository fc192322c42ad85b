//! Collection blob encoding.
//!
//! # Responsibility
//! - Convert a `TodoCollection` to and from its persisted JSON text.
//!
//! # Invariants
//! - `decode_collection(&encode_collection(c)?)? == c` for every collection.
//! - A literal `null` document decodes to an empty collection.
//! - Malformed documents are rejected, never partially applied.

use crate::model::collection::TodoCollection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key under which the whole collection blob lives.
pub const TODO_LIST_KEY: &str = "toDoList";

/// Blob encoding/decoding failure.
#[derive(Debug)]
pub enum BlobError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for BlobError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode todo blob: {err}"),
            Self::Decode(err) => write!(f, "invalid todo blob: {err}"),
        }
    }
}

impl Error for BlobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

pub fn encode_collection(collection: &TodoCollection) -> Result<String, BlobError> {
    serde_json::to_string(collection).map_err(BlobError::Encode)
}

pub fn decode_collection(blob: &str) -> Result<TodoCollection, BlobError> {
    serde_json::from_str::<Option<TodoCollection>>(blob)
        .map(Option::unwrap_or_default)
        .map_err(BlobError::Decode)
}
