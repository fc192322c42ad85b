//! To-do store: state owner and persistence trigger.
//!
//! # Responsibility
//! - Own the `AppState` for one screen and expose its user operations.
//! - Load the collection once at startup, recovering from bad storage.
//! - Enqueue a full snapshot write after every mutation.
//!
//! # Invariants
//! - In-memory state is authoritative; failed writes never roll it back.
//! - `is_loading` flips to `false` exactly once, after the first `load`.
//! - Operations on unknown ids never fail.

use crate::model::collection::TodoCollection;
use crate::model::todo::{now_epoch_ms, TodoId, TodoItem};
use crate::repo::blob_codec::{decode_collection, encode_collection, TODO_LIST_KEY};
use crate::repo::kv_repo::{KeyValueStore, RepoResult};
use crate::service::persist_queue::PersistQueue;
use crate::service::state::{reduce, Action, AppState};
use log::{debug, error, info, warn};
use std::time::Instant;

/// Single-screen to-do state with write-behind persistence.
pub struct TodoStore {
    state: AppState,
    queue: PersistQueue,
}

impl TodoStore {
    /// Creates a store in the loading state backed by `adapter`.
    ///
    /// The adapter moves onto the persistence worker; call `load` next.
    pub fn new<S>(adapter: S) -> RepoResult<Self>
    where
        S: KeyValueStore + Send + 'static,
    {
        Ok(Self {
            state: AppState::new(),
            queue: PersistQueue::spawn(adapter, TODO_LIST_KEY)?,
        })
    }

    /// Reads the persisted collection and leaves the loading state.
    ///
    /// Read and decode failures are logged and replaced by an empty
    /// collection. Calls after the first one do nothing.
    pub fn load(&mut self) {
        if !self.state.is_loading {
            debug!("event=todo_load module=store status=skipped reason=already_loaded");
            return;
        }

        let started_at = Instant::now();
        info!("event=todo_load module=store status=start");
        let collection = match self.queue.load() {
            Ok(Some(blob)) => match decode_collection(&blob) {
                Ok(collection) => collection,
                Err(err) => {
                    error!(
                        "event=todo_load module=store status=error error_code=blob_invalid bytes={} error={}",
                        blob.len(),
                        err
                    );
                    TodoCollection::new()
                }
            },
            Ok(None) => TodoCollection::new(),
            Err(err) => {
                error!(
                    "event=todo_load module=store status=error error_code=read_failed error={}",
                    err
                );
                TodoCollection::new()
            }
        };

        let count = collection.len();
        self.dispatch(Action::Loaded(collection));
        info!(
            "event=todo_load module=store status=ok items={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn pending_text(&self) -> &str {
        &self.state.pending_text
    }

    pub fn collection(&self) -> &TodoCollection {
        &self.state.collection
    }

    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.state.collection.get(id)
    }

    /// Items in on-screen order (most recently inserted first).
    pub fn display_order(&self) -> Vec<&TodoItem> {
        self.state.collection.display_order()
    }

    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.dispatch(Action::SetPendingText(text.into()));
    }

    /// Commits the pending text as a new item.
    ///
    /// Returns the new id, or `None` when the pending text is empty or the
    /// store is still loading.
    pub fn add_todo(&mut self) -> Option<TodoId> {
        if self.state.pending_text.is_empty() {
            return None;
        }
        let id = TodoId::generate();
        self.dispatch(Action::AddTodo {
            id: id.clone(),
            created_at: now_epoch_ms(),
        });
        self.state.collection.contains(&id).then_some(id)
    }

    pub fn delete_todo(&mut self, id: &TodoId) {
        self.dispatch(Action::DeleteTodo(id.clone()));
    }

    pub fn complete_todo(&mut self, id: &TodoId) {
        self.dispatch(Action::CompleteTodo(id.clone()));
    }

    pub fn uncomplete_todo(&mut self, id: &TodoId) {
        self.dispatch(Action::UncompleteTodo(id.clone()));
    }

    /// Flips the completion flag of `id`; unknown ids are ignored.
    pub fn toggle_todo(&mut self, id: &TodoId) {
        match self.state.collection.get(id).map(|item| item.is_completed) {
            Some(true) => self.uncomplete_todo(id),
            Some(false) => self.complete_todo(id),
            None => debug!("event=todo_toggle module=store status=skipped reason=unknown_id"),
        }
    }

    /// Replaces the text of `id`. Empty text is accepted here.
    pub fn update_text(&mut self, id: &TodoId, text: impl Into<String>) {
        self.dispatch(Action::UpdateText {
            id: id.clone(),
            text: text.into(),
        });
    }

    /// Blocks until all writes issued so far have been attempted.
    pub fn flush(&self) {
        self.queue.flush();
    }

    fn dispatch(&mut self, action: Action) {
        if self.state.is_loading && action.is_mutation() {
            warn!("event=todo_mutation module=store status=skipped reason=still_loading");
        }
        if let Some(id) = missing_target(&self.state.collection, &action) {
            debug!("event=todo_mutation module=store status=noop reason=unknown_id id={id}");
        }

        let transition = reduce(&self.state, action);
        self.state = transition.state;
        if transition.persist {
            self.persist_snapshot();
        }
    }

    fn persist_snapshot(&self) {
        match encode_collection(&self.state.collection) {
            Ok(blob) => self.queue.save(blob),
            Err(err) => error!(
                "event=todo_persist module=store status=error error_code=encode_failed error={}",
                err
            ),
        }
    }
}

fn missing_target<'a>(collection: &TodoCollection, action: &'a Action) -> Option<&'a TodoId> {
    let id = match action {
        Action::DeleteTodo(id) | Action::CompleteTodo(id) | Action::UncompleteTodo(id) => id,
        Action::UpdateText { id, .. } => id,
        Action::Loaded(_) | Action::SetPendingText(_) | Action::AddTodo { .. } => return None,
    };
    (!collection.contains(id)).then_some(id)
}
