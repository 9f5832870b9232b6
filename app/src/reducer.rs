//! Reducer logic for the task list.
//!
//! Every mutating action changes state in place and returns the persistence
//! effect for the slots it touched. Actions that change nothing return no
//! effects, so nothing is written.

use crate::persistence::persist;
use crate::types::{ItemId, Slot, TodoAction, TodoItem, TodoState};
use std::collections::BTreeSet;
use std::sync::Arc;
use tasklist_core::{
    effect::Effect, environment::IdGenerator, kv::KeyValueStore, reducer::Reducer, smallvec,
    SmallVec,
};

/// Environment dependencies for the task list reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new items
    pub ids: Arc<dyn IdGenerator>,
    /// Where the slots are persisted
    pub store: Arc<dyn KeyValueStore>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { ids, store }
    }
}

/// Reducer for the task list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The text a new item would get, or `None` if the draft is blank
    fn submitted_text(state: &TodoState) -> Option<String> {
        let text = state.draft_text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Validates a `DeleteItems` action against the current items
    fn validate_delete_items(state: &TodoState, positions: &BTreeSet<usize>) -> Result<(), String> {
        match positions.last() {
            Some(&max) if max >= state.items.len() => Err(format!(
                "Delete rejected: position {max} out of bounds for {} items",
                state.items.len()
            )),
            _ => Ok(()),
        }
    }

    fn persist(
        state: &TodoState,
        env: &TodoEnvironment,
        slots: &[Slot],
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        smallvec![persist(&env.store, state, slots)]
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::AddItem => {
                // Blank drafts are ignored without a trace
                let Some(text) = Self::submitted_text(state) else {
                    return SmallVec::new();
                };

                let id = ItemId::from_uuid(env.ids.next_id());
                if state.contains(&id) {
                    state.last_warning = Some(format!("Add rejected: id {id} already in use"));
                    return SmallVec::new();
                }

                state.items.push(TodoItem::new(id, text));
                state.draft_text.clear();
                state.last_warning = None;

                Self::persist(state, env, &[Slot::Items, Slot::DraftText])
            },

            TodoAction::ToggleCompleted { id } => {
                let Some(item) = state.items.iter_mut().find(|item| item.id == id) else {
                    return SmallVec::new();
                };
                item.toggle();
                state.last_warning = None;

                Self::persist(state, env, &[Slot::Items])
            },

            TodoAction::DeleteItems { positions } => {
                if let Err(warning) = Self::validate_delete_items(state, &positions) {
                    state.last_warning = Some(warning);
                    return SmallVec::new();
                }

                // Highest first so the remaining positions stay valid
                for &position in positions.iter().rev() {
                    state.items.remove(position);
                }
                state.last_warning = None;

                Self::persist(state, env, &[Slot::Items])
            },

            TodoAction::SetDraftText { text } => {
                state.draft_text = text;
                state.last_warning = None;
                Self::persist(state, env, &[Slot::DraftText])
            },

            TodoAction::SetShowCompleted { show } => {
                state.show_completed = show;
                state.last_warning = None;
                Self::persist(state, env, &[Slot::ShowCompleted])
            },

            TodoAction::Flush => {
                // Only failures fed back by this flush remain afterwards
                state.last_warning = None;
                Self::persist(state, env, &Slot::ALL)
            },

            TodoAction::PersistFailed { slot, reason } => {
                state.last_warning = Some(format!("Could not save {slot}: {reason}"));
                SmallVec::new()
            },
        }
    }
}
