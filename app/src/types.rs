//! Domain types for the task list.
//!
//! The list is an ordered sequence of items plus two preferences: the text
//! being typed for the next item and whether completed items are shown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for a task item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Creates an `ItemId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: ItemId,
    /// What the task is
    pub text: String,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed item
    #[must_use]
    pub const fn new(id: ItemId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }

    /// Flips the completion flag
    pub const fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// State of the task list
///
/// Everything except `last_warning` is persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Items in insertion order
    pub items: Vec<TodoItem>,
    /// Text typed for the next item, not yet submitted
    pub draft_text: String,
    /// Whether completed items are displayed
    pub show_completed: bool,
    /// Most recent recoverable problem (rejected delete, failed write)
    pub last_warning: Option<String>,
}

impl TodoState {
    /// Creates an empty state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            draft_text: String::new(),
            show_completed: false,
            last_warning: None,
        }
    }

    /// Returns the number of items
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Position of the item with `id` in `items`
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }
}

/// A named slot in the key-value store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The item list
    Items,
    /// The draft text
    DraftText,
    /// The show-completed flag
    ShowCompleted,
}

impl Slot {
    /// Every slot, in the order they are flushed
    pub const ALL: [Self; 3] = [Self::Items, Self::DraftText, Self::ShowCompleted];

    /// Key under which the slot is stored
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Items => "todoItems",
            Self::DraftText => "newItemText",
            Self::ShowCompleted => "showCompleted",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Actions the task list reducer understands
///
/// Every variant except `PersistFailed` comes from the user or the
/// application shell. `PersistFailed` is fed back by persistence effects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Append the trimmed draft text as a new item and clear the draft
    AddItem,

    /// Flip the completion flag of an item
    ToggleCompleted {
        /// Item to toggle
        id: ItemId,
    },

    /// Remove the items at the given positions in `items`
    DeleteItems {
        /// Positions in the current item order
        positions: BTreeSet<usize>,
    },

    /// Replace the draft text verbatim
    SetDraftText {
        /// New draft text
        text: String,
    },

    /// Replace the show-completed flag
    SetShowCompleted {
        /// Whether completed items are shown
        show: bool,
    },

    /// Write every slot without changing state
    Flush,

    /// A slot could not be written
    PersistFailed {
        /// Slot that was left unwritten
        slot: Slot,
        /// Why the write failed
        reason: String,
    },
}

impl TodoAction {
    /// Convenience constructor for [`TodoAction::DeleteItems`]
    #[must_use]
    pub fn delete_at(positions: impl IntoIterator<Item = usize>) -> Self {
        Self::DeleteItems {
            positions: positions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;

    fn item(n: u128, text: &str) -> TodoItem {
        TodoItem::new(ItemId::from_uuid(Uuid::from_u128(n)), text.to_string())
    }

    #[test]
    fn item_id_display_is_uuid() {
        let id = ItemId::from_uuid(Uuid::from_u128(1));
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn item_new_is_not_completed() {
        let mut todo = item(1, "Buy milk");
        assert!(!todo.completed);
        todo.toggle();
        assert!(todo.completed);
        todo.toggle();
        assert!(!todo.completed);
    }

    #[test]
    fn item_serializes_as_flat_record() {
        let json = serde_json::to_value(item(1, "Buy milk")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000001",
                "text": "Buy milk",
                "completed": false,
            })
        );
    }

    #[test]
    fn item_completed_defaults_when_missing() {
        let todo: TodoItem = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000002","text":"Eggs"}"#,
        )
        .unwrap();
        assert!(!todo.completed);
    }

    #[test]
    fn state_lookup_helpers() {
        let mut state = TodoState::new();
        state.items = vec![item(1, "A"), item(2, "B")];
        state.items[1].completed = true;

        let b = state.items[1].id;
        assert_eq!(state.count(), 2);
        assert_eq!(state.completed_count(), 1);
        assert_eq!(state.position(&b), Some(1));
        assert!(!state.contains(&ItemId::from_uuid(Uuid::from_u128(9))));
    }

    #[test]
    fn slot_keys_are_distinct() {
        let keys: BTreeSet<_> = Slot::ALL.iter().map(|slot| slot.key()).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(Slot::Items.to_string(), "todoItems");
    }

    #[test]
    fn delete_at_collects_positions() {
        assert_eq!(
            TodoAction::delete_at([2, 0, 2]),
            TodoAction::DeleteItems {
                positions: BTreeSet::from([0, 2]),
            }
        );
    }
}
