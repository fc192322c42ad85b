//! Key-value persistence contracts and implementations.
//!
//! # Responsibility
//! - Provide `get`/`set` over string blobs addressed by a string key.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `get` returning `Ok(None)` means "never written", not a failure.
//! - `set` replaces the whole value; the last write wins.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was opened without the key-value schema applied.
    SchemaMissing,
    /// Storage cannot currently serve reads or writes.
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaMissing => write!(f, "kv_entries table is missing; open via open_db"),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaMissing | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for string blobs.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value store.
///
/// Owns its connection so it can be moved onto the persistence worker thread.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection that already has migrations applied.
    ///
    /// # Errors
    /// - `SchemaMissing` when `kv_entries` does not exist.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(RepoError::SchemaMissing);
        }
        Ok(Self { conn })
    }

    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: HashMap<String, String>,
    unavailable: bool,
    write_count: usize,
}

/// In-memory key-value store.
///
/// Clones share the same entries, so a caller can keep one handle for
/// inspection while another is owned by the persistence worker.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    inner: Arc<Mutex<MemoryEntries>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one entry without counting it as a write.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.inner.lock() {
            entries.values.insert(key.into(), value.into());
        }
        self
    }

    /// Makes every subsequent `get`/`set` fail until re-enabled.
    pub fn set_available(&self, available: bool) {
        if let Ok(mut entries) = self.inner.lock() {
            entries.unavailable = !available;
        }
    }

    /// Reads a value directly, bypassing availability.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|entries| entries.values.get(key).cloned())
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.inner.lock().map_or(0, |entries| entries.write_count)
    }

    fn entries(&self) -> RepoResult<MutexGuard<'_, MemoryEntries>> {
        let entries = self
            .inner
            .lock()
            .map_err(|_| RepoError::Unavailable("memory store lock poisoned".to_string()))?;
        if entries.unavailable {
            return Err(RepoError::Unavailable("memory store disabled".to_string()));
        }
        Ok(entries)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.entries()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepoResult<()> {
        let mut entries = self.entries()?;
        entries.values.insert(key.to_string(), value.to_string());
        entries.write_count += 1;
        Ok(())
    }
}
