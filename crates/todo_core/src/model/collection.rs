//! Insertion-ordered to-do collection.
//!
//! # Responsibility
//! - Hold every item keyed by id, preserving insertion order.
//! - Serialize as an object-of-objects keyed by id.
//!
//! # Invariants
//! - Every key equals the `id` of its value; decoding rejects mismatches.
//! - Keys are unique. Re-inserting an existing id replaces the value in place.
//! - Entry order follows insertion order (document order when decoded).

use crate::model::todo::{TodoId, TodoItem};
use serde::de::{Error as DeError, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Formatter;

/// Mapping `id -> TodoItem` that remembers insertion order.
///
/// Lists stay small (a single screen), so lookups are linear scans over a
/// `Vec` instead of a hashed index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoCollection {
    items: Vec<TodoItem>,
}

impl TodoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &TodoId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }

    /// Inserts an item keyed by its own id.
    ///
    /// Returns the replaced value when the id was already present; the entry
    /// keeps its original position in that case.
    pub fn insert(&mut self, item: TodoItem) -> Option<TodoItem> {
        match self.position(&item.id) {
            Some(index) => Some(std::mem::replace(&mut self.items[index], item)),
            None => {
                self.items.push(item);
                None
            }
        }
    }

    /// Removes the entry for `id`, keeping the relative order of the rest.
    pub fn remove(&mut self, id: &TodoId) -> Option<TodoItem> {
        self.position(id).map(|index| self.items.remove(index))
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TodoItem> + '_ {
        self.items.iter()
    }

    /// Entries in on-screen order: reverse of insertion order.
    pub fn display_order(&self) -> Vec<&TodoItem> {
        self.items.iter().rev().collect()
    }

    /// Entries sorted by `created_at` descending.
    ///
    /// Ties keep reverse insertion order.
    pub fn newest_first(&self) -> Vec<&TodoItem> {
        let mut ordered = self.display_order();
        ordered.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        ordered
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_completed).count()
    }

    fn position(&self, id: &TodoId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

impl FromIterator<TodoItem> for TodoCollection {
    fn from_iter<T: IntoIterator<Item = TodoItem>>(iter: T) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.insert(item);
        }
        collection
    }
}

impl Serialize for TodoCollection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for item in &self.items {
            map.serialize_entry(item.id.as_str(), item)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TodoCollection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(CollectionVisitor)
    }
}

struct CollectionVisitor;

impl<'de> Visitor<'de> for CollectionVisitor {
    type Value = TodoCollection;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("an object mapping todo ids to todo items")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut collection = TodoCollection::new();
        while let Some((key, item)) = access.next_entry::<String, TodoItem>()? {
            if key != item.id.as_str() {
                return Err(A::Error::custom(format!(
                    "key `{key}` does not match item id `{}`",
                    item.id
                )));
            }
            item.validate().map_err(A::Error::custom)?;
            collection.insert(item);
        }
        Ok(collection)
    }
}
