use todo_core::{
    decode_collection, MemoryKeyValueStore, SqliteKeyValueStore, TodoId, TodoStore, TODO_LIST_KEY,
};

fn loaded_store(adapter: &MemoryKeyValueStore) -> TodoStore {
    let mut store = TodoStore::new(adapter.clone()).unwrap();
    store.load();
    store
}

fn add(store: &mut TodoStore, text: &str) -> TodoId {
    store.set_pending_text(text);
    store.add_todo().unwrap()
}

fn persisted(adapter: &MemoryKeyValueStore) -> todo_core::TodoCollection {
    decode_collection(&adapter.peek(TODO_LIST_KEY).unwrap()).unwrap()
}

#[test]
fn store_starts_loading_until_load_completes() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = TodoStore::new(adapter.clone()).unwrap();
    assert!(store.is_loading());

    store.load();

    assert!(!store.is_loading());
    assert!(store.collection().is_empty());
    store.flush();
    assert_eq!(adapter.write_count(), 0);
}

#[test]
fn adding_buy_milk_creates_one_open_item() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);

    store.set_pending_text("Buy milk");
    let id = store.add_todo().unwrap();

    assert_eq!(store.collection().len(), 1);
    let item = store.get(&id).unwrap();
    assert_eq!(item.text, "Buy milk");
    assert!(!item.is_completed);
    assert_eq!(store.pending_text(), "");

    store.flush();
    assert_eq!(persisted(&adapter), *store.collection());
}

#[test]
fn add_with_empty_pending_text_is_a_noop() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    add(&mut store, "existing");
    store.flush();
    let blob_before = adapter.peek(TODO_LIST_KEY);
    let writes_before = adapter.write_count();

    store.set_pending_text("");
    assert_eq!(store.add_todo(), None);

    store.flush();
    assert_eq!(store.collection().len(), 1);
    assert_eq!(adapter.peek(TODO_LIST_KEY), blob_before);
    assert_eq!(adapter.write_count(), writes_before);
}

#[test]
fn set_pending_text_does_not_write() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);

    store.set_pending_text("draft");
    store.flush();

    assert_eq!(store.pending_text(), "draft");
    assert_eq!(adapter.write_count(), 0);
    assert!(store.collection().is_empty());
}

#[test]
fn complete_uncomplete_and_toggle_flip_the_flag() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    let id = add(&mut store, "x");

    store.complete_todo(&id);
    assert!(store.get(&id).unwrap().is_completed);
    store.complete_todo(&id);
    assert!(store.get(&id).unwrap().is_completed);

    store.uncomplete_todo(&id);
    assert!(!store.get(&id).unwrap().is_completed);

    store.toggle_todo(&id);
    assert!(store.get(&id).unwrap().is_completed);
    assert_eq!(store.get(&id).unwrap().text, "x");

    store.flush();
    assert!(persisted(&adapter).get(&id).unwrap().is_completed);
}

#[test]
fn update_text_and_delete_are_persisted() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    let keep = add(&mut store, "keep");
    let drop_me = add(&mut store, "drop");

    store.update_text(&keep, "kept");
    store.delete_todo(&drop_me);
    store.flush();

    let saved = persisted(&adapter);
    assert_eq!(saved.len(), 1);
    assert_eq!(saved.get(&keep).unwrap().text, "kept");
    assert!(saved.get(&drop_me).is_none());
}

#[test]
fn unknown_ids_are_ignored_without_error() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    add(&mut store, "only");
    let before = store.collection().clone();
    let ghost = TodoId::from("ghost");

    store.delete_todo(&ghost);
    store.complete_todo(&ghost);
    store.uncomplete_todo(&ghost);
    store.toggle_todo(&ghost);
    store.update_text(&ghost, "boo");

    assert_eq!(*store.collection(), before);
    store.flush();
    assert_eq!(persisted(&adapter), before);
}

#[test]
fn load_reads_existing_blob() {
    let adapter = MemoryKeyValueStore::new().with_entry(
        TODO_LIST_KEY,
        r#"{"id1":{"id":"id1","text":"Task","isCompleted":false,"createdAt":1000}}"#,
    );
    let store = loaded_store(&adapter);

    assert!(!store.is_loading());
    assert_eq!(store.collection().len(), 1);
    let item = store.get(&TodoId::from("id1")).unwrap();
    assert_eq!(item.text, "Task");
    assert!(!item.is_completed);
    assert_eq!(item.created_at, 1000);
}

#[test]
fn load_falls_back_to_empty_on_malformed_blob() {
    let adapter = MemoryKeyValueStore::new().with_entry(TODO_LIST_KEY, "{{{ not json");
    let store = loaded_store(&adapter);

    assert!(!store.is_loading());
    assert!(store.collection().is_empty());
}

#[test]
fn load_falls_back_to_empty_when_storage_is_unavailable() {
    let adapter = MemoryKeyValueStore::new().with_entry(TODO_LIST_KEY, "{}");
    adapter.set_available(false);
    let store = loaded_store(&adapter);

    assert!(!store.is_loading());
    assert!(store.collection().is_empty());
}

#[test]
fn second_load_does_not_reread_storage() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    let id = add(&mut store, "in memory");
    store.flush();

    adapter.set_available(false);
    store.load();

    assert!(store.get(&id).is_some());
}

#[test]
fn mutations_before_load_are_ignored() {
    let adapter = MemoryKeyValueStore::new().with_entry(TODO_LIST_KEY, "{}");
    let mut store = TodoStore::new(adapter.clone()).unwrap();

    store.set_pending_text("too early");
    assert_eq!(store.add_todo(), None);
    store.flush();

    assert_eq!(adapter.write_count(), 0);
    assert_eq!(store.pending_text(), "too early");

    store.load();
    assert!(store.add_todo().is_some());
}

#[test]
fn write_failure_keeps_in_memory_state() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    adapter.set_available(false);

    let id = add(&mut store, "unsaved");
    store.flush();

    assert!(store.get(&id).is_some());
    assert_eq!(adapter.peek(TODO_LIST_KEY), None);

    adapter.set_available(true);
    store.complete_todo(&id);
    store.flush();
    assert!(persisted(&adapter).get(&id).unwrap().is_completed);
}

#[test]
fn display_order_is_most_recent_first() {
    let adapter = MemoryKeyValueStore::new();
    let mut store = loaded_store(&adapter);
    let first = add(&mut store, "first");
    let second = add(&mut store, "second");
    let third = add(&mut store, "third");

    let ids: Vec<&TodoId> = store.display_order().into_iter().map(|item| &item.id).collect();
    assert_eq!(ids, [&third, &second, &first]);
}

#[test]
fn collection_survives_restart_with_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let (kept, done) = {
        let mut store = TodoStore::new(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
        store.load();
        let kept = add(&mut store, "kept");
        let done = add(&mut store, "done");
        let gone = add(&mut store, "gone");
        store.complete_todo(&done);
        store.delete_todo(&gone);
        (kept, done)
    };

    let mut restarted = TodoStore::new(SqliteKeyValueStore::open(&path).unwrap()).unwrap();
    restarted.load();

    let ids: Vec<&TodoId> = restarted
        .display_order()
        .into_iter()
        .map(|item| &item.id)
        .collect();
    assert_eq!(ids, [&done, &kept]);
    assert!(restarted.get(&done).unwrap().is_completed);
    assert!(!restarted.get(&kept).unwrap().is_completed);
}
