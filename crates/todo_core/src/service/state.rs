//! Application state and its transition function.
//!
//! ```text
//! AppState + Action  ->  reduce()  ->  Transition { state, persist }
//! ```
//!
//! # Responsibility
//! - Define the state owned by the store: pending text, loading flag, items.
//! - Compute the next state for every user action without side effects.
//!
//! # Invariants
//! - `reduce` is deterministic: ids and timestamps arrive inside the action.
//! - Each transition rebuilds only the fields its action changes.
//! - Mutating actions are ignored until the initial load has completed.
//! - Actions on unknown ids leave the collection unchanged.

use crate::model::collection::TodoCollection;
use crate::model::todo::{TodoId, TodoItem};

/// Everything the single to-do screen renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Text typed into the new-item field but not yet submitted.
    pub pending_text: String,
    /// `true` until the first load attempt finishes.
    pub is_loading: bool,
    pub collection: TodoCollection,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            pending_text: String::new(),
            is_loading: true,
            collection: TodoCollection::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// A discrete user or lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Startup load finished, with the recovered (possibly empty) collection.
    Loaded(TodoCollection),
    SetPendingText(String),
    /// Commit pending text as a new item with the given identity.
    AddTodo { id: TodoId, created_at: i64 },
    DeleteTodo(TodoId),
    CompleteTodo(TodoId),
    UncompleteTodo(TodoId),
    UpdateText { id: TodoId, text: String },
}

impl Action {
    /// Whether this action belongs to the set that rewrites the blob.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Loaded(_) | Self::SetPendingText(_))
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: AppState,
    /// `true` when the collection blob must be rewritten.
    pub persist: bool,
}

impl Transition {
    fn unchanged(state: &AppState) -> Self {
        Self {
            state: state.clone(),
            persist: false,
        }
    }

    fn persisted(state: AppState) -> Self {
        Self {
            state,
            persist: true,
        }
    }
}

/// Applies `action` to `state`, returning the next state.
pub fn reduce(state: &AppState, action: Action) -> Transition {
    if state.is_loading && action.is_mutation() {
        return Transition::unchanged(state);
    }

    match action {
        Action::Loaded(collection) => {
            if !state.is_loading {
                return Transition::unchanged(state);
            }
            Transition {
                state: AppState {
                    pending_text: state.pending_text.clone(),
                    is_loading: false,
                    collection,
                },
                persist: false,
            }
        }
        Action::SetPendingText(text) => Transition {
            state: AppState {
                pending_text: text,
                is_loading: state.is_loading,
                collection: state.collection.clone(),
            },
            persist: false,
        },
        Action::AddTodo { id, created_at } => {
            let Ok(item) = TodoItem::with_id(id, state.pending_text.clone(), created_at) else {
                return Transition::unchanged(state);
            };
            let mut collection = state.collection.clone();
            collection.insert(item);
            Transition::persisted(AppState {
                pending_text: String::new(),
                is_loading: state.is_loading,
                collection,
            })
        }
        Action::DeleteTodo(id) => {
            let mut collection = state.collection.clone();
            collection.remove(&id);
            Transition::persisted(with_collection(state, collection))
        }
        Action::CompleteTodo(id) => patch_item(state, &id, |item| item.is_completed = true),
        Action::UncompleteTodo(id) => patch_item(state, &id, |item| item.is_completed = false),
        Action::UpdateText { id, text } => patch_item(state, &id, move |item| item.text = text),
    }
}

/// Applies a sequence of actions from `initial`, in order.
pub fn replay(initial: &AppState, actions: impl IntoIterator<Item = Action>) -> AppState {
    actions
        .into_iter()
        .fold(initial.clone(), |state, action| reduce(&state, action).state)
}

fn patch_item(state: &AppState, id: &TodoId, patch: impl FnOnce(&mut TodoItem)) -> Transition {
    let mut collection = state.collection.clone();
    if let Some(item) = collection.get_mut(id) {
        patch(item);
    }
    Transition::persisted(with_collection(state, collection))
}

fn with_collection(state: &AppState, collection: TodoCollection) -> AppState {
    AppState {
        pending_text: state.pending_text.clone(),
        is_loading: state.is_loading,
        collection,
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, Action, AppState};
    use crate::model::collection::TodoCollection;
    use crate::model::todo::TodoId;

    fn ready() -> AppState {
        reduce(&AppState::new(), Action::Loaded(TodoCollection::new())).state
    }

    #[test]
    fn mutations_before_load_are_ignored() {
        let loading = AppState::new();
        let transition = reduce(
            &loading,
            Action::DeleteTodo(TodoId::from("anything")),
        );
        assert!(!transition.persist);
        assert_eq!(transition.state, loading);
    }

    #[test]
    fn pending_text_is_editable_while_loading() {
        let transition = reduce(&AppState::new(), Action::SetPendingText("draft".into()));
        assert!(transition.state.is_loading);
        assert_eq!(transition.state.pending_text, "draft");
        assert!(!transition.persist);
    }

    #[test]
    fn second_load_is_ignored() {
        let state = ready();
        let transition = reduce(&state, Action::Loaded(TodoCollection::new()));
        assert!(!transition.persist);
        assert_eq!(transition.state, state);
    }

    #[test]
    fn add_with_empty_pending_text_does_not_persist() {
        let state = ready();
        let transition = reduce(
            &state,
            Action::AddTodo {
                id: TodoId::from("x"),
                created_at: 1,
            },
        );
        assert!(!transition.persist);
        assert!(transition.state.collection.is_empty());
    }
}
