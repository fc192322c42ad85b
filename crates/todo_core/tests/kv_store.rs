use rusqlite::Connection;
use todo_core::db::open_db;
use todo_core::{KeyValueStore, MemoryKeyValueStore, RepoError, SqliteKeyValueStore};

#[test]
fn missing_key_is_absent_not_error() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();

    assert_eq!(store.get("toDoList").unwrap(), None);
}

#[test]
fn set_overwrites_previous_value() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();

    store.set("toDoList", "{}").unwrap();
    store.set("toDoList", r#"{"a":1}"#).unwrap();

    assert_eq!(store.get("toDoList").unwrap().as_deref(), Some(r#"{"a":1}"#));
    assert_eq!(store.get("other").unwrap(), None);
}

#[test]
fn values_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let store = SqliteKeyValueStore::open(&path).unwrap();
    store.set("toDoList", "persisted").unwrap();
    drop(store);

    let reopened = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(reopened.get("toDoList").unwrap().as_deref(), Some("persisted"));
}

#[test]
fn try_new_accepts_migrated_connection() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("todo.db")).unwrap();

    let store = SqliteKeyValueStore::try_new(conn).unwrap();
    store.set("k", "v").unwrap();
}

#[test]
fn try_new_rejects_connection_without_schema() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteKeyValueStore::try_new(conn).err().unwrap();
    assert!(matches!(err, RepoError::SchemaMissing));
}

#[test]
fn memory_store_seeded_entry_reads_back() {
    let store = MemoryKeyValueStore::new().with_entry("toDoList", "{}");

    assert_eq!(store.get("toDoList").unwrap().as_deref(), Some("{}"));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn memory_store_recovers_after_outage() {
    let store = MemoryKeyValueStore::new();
    store.set_available(false);
    assert!(store.set("k", "lost").is_err());

    store.set_available(true);
    store.set("k", "kept").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("kept"));
}
