//! Loading and persisting the task list through a key-value store.
//!
//! Each [`Slot`] is stored under its own key as JSON:
//!
//! | Key | Value | Default when absent |
//! |---|---|---|
//! | `todoItems` | array of `{ "id", "text", "completed" }` | `[]` |
//! | `newItemText` | string | `""` |
//! | `showCompleted` | boolean | `false` |
//!
//! Writes are described as effects by [`persist`] so the reducer names the
//! slots it persists at every mutation. A slot that cannot be encoded or
//! written is skipped for that cycle; the failure is logged and fed back as
//! [`TodoAction::PersistFailed`]. In-memory state is never rolled back.

use crate::types::{Slot, TodoAction, TodoItem, TodoState};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tasklist_core::effect::Effect;
use tasklist_core::kv::{KeyValueStore, KvError};

/// Encode the value `state` holds for `slot`
///
/// # Errors
///
/// Returns the encoder error if the value cannot be represented as JSON.
pub fn encode_slot(state: &TodoState, slot: Slot) -> Result<Vec<u8>, serde_json::Error> {
    match slot {
        Slot::Items => serde_json::to_vec(&state.items),
        Slot::DraftText => serde_json::to_vec(&state.draft_text),
        Slot::ShowCompleted => serde_json::to_vec(&state.show_completed),
    }
}

/// Load the persisted state, defaulting every slot that is absent
///
/// A slot holding data that does not decode is treated as absent and logged.
///
/// # Errors
///
/// Returns the store error if a slot cannot be read at all.
pub fn load_state<S: KeyValueStore + ?Sized>(store: &S) -> Result<TodoState, KvError> {
    let items: Vec<TodoItem> = load_slot(store, Slot::Items)?;
    let draft_text: String = load_slot(store, Slot::DraftText)?;
    let show_completed: bool = load_slot(store, Slot::ShowCompleted)?;

    tracing::info!(
        items = items.len(),
        show_completed,
        "Loaded persisted state"
    );

    Ok(TodoState {
        items: dedup_by_id(items),
        draft_text,
        show_completed,
        last_warning: None,
    })
}

fn load_slot<S, T>(store: &S, slot: Slot) -> Result<T, KvError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    let Some(bytes) = store.get(slot.key())? else {
        tracing::debug!(%slot, "Slot absent, using default");
        return Ok(T::default());
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!(%slot, %error, "Slot holds undecodable data, using default");
            Ok(T::default())
        },
    }
}

/// Keep the first occurrence of every id
fn dedup_by_id(items: Vec<TodoItem>) -> Vec<TodoItem> {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    let before = items.len();
    let items: Vec<TodoItem> = items.into_iter().filter(|item| seen.insert(item.id)).collect();
    if items.len() != before {
        tracing::warn!(dropped = before - items.len(), "Dropped items with duplicate ids");
    }
    items
}

/// Describe writing `slots` of `state` to `store`
///
/// Values are encoded immediately, so the effect writes the state as it was
/// when the reducer returned. Slots are written in the order given.
pub fn persist(
    store: &Arc<dyn KeyValueStore>,
    state: &TodoState,
    slots: &[Slot],
) -> Effect<TodoAction> {
    let mut effects: Vec<Effect<TodoAction>> = slots
        .iter()
        .map(|&slot| persist_slot(store, state, slot))
        .collect();

    if effects.len() == 1 {
        effects.remove(0)
    } else {
        Effect::chain(effects)
    }
}

fn persist_slot(
    store: &Arc<dyn KeyValueStore>,
    state: &TodoState,
    slot: Slot,
) -> Effect<TodoAction> {
    let bytes = match encode_slot(state, slot) {
        Ok(bytes) => bytes,
        // Unreachable for the current slot types, which always encode
        Err(error) => {
            tracing::warn!(%slot, %error, "Encoding failed, slot left unwritten");
            let reason = error.to_string();
            return Effect::future(async move { Some(TodoAction::PersistFailed { slot, reason }) });
        },
    };

    let store = Arc::clone(store);
    Effect::future(async move {
        match store.set(slot.key(), &bytes) {
            Ok(()) => {
                tracing::debug!(%slot, bytes = bytes.len(), "Persisted slot");
                None
            },
            Err(error) => {
                tracing::warn!(%slot, %error, "Write failed, slot left unwritten");
                Some(TodoAction::PersistFailed {
                    slot,
                    reason: error.to_string(),
                })
            },
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can use unwrap

    use super::*;
    use crate::types::ItemId;
    use tasklist_testing::helpers::block_on_effects;
    use tasklist_testing::{FailingStore, InMemoryStore};
    use uuid::Uuid;

    fn sample_state() -> TodoState {
        let mut state = TodoState::new();
        state.items = vec![
            TodoItem::new(ItemId::from_uuid(Uuid::from_u128(1)), "Buy milk".to_string()),
            TodoItem {
                id: ItemId::from_uuid(Uuid::from_u128(2)),
                text: "Walk dog".to_string(),
                completed: true,
            },
        ];
        state.draft_text = "  half typed".to_string();
        state.show_completed = true;
        state
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = InMemoryStore::new();
        let state = load_state(&store).unwrap();
        assert_eq!(state, TodoState::new());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let kv = Arc::new(InMemoryStore::new());
        let store: Arc<dyn KeyValueStore> = kv.clone();
        let state = sample_state();

        let feedback = block_on_effects([persist(&store, &state, &Slot::ALL)]);
        assert!(feedback.is_empty());
        assert_eq!(kv.writes(), 3);

        let loaded = load_state(kv.as_ref()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn slots_use_json_encoding() {
        let state = sample_state();
        assert_eq!(encode_slot(&state, Slot::DraftText).unwrap(), b"\"  half typed\"");
        assert_eq!(encode_slot(&state, Slot::ShowCompleted).unwrap(), b"true");
        let items: serde_json::Value =
            serde_json::from_slice(&encode_slot(&state, Slot::Items).unwrap()).unwrap();
        assert_eq!(items[1]["completed"], serde_json::json!(true));
    }

    #[test]
    fn persist_writes_only_named_slots() {
        let kv = Arc::new(InMemoryStore::new());
        let store: Arc<dyn KeyValueStore> = kv.clone();

        block_on_effects([persist(&store, &sample_state(), &[Slot::ShowCompleted])]);

        assert!(kv.contains("showCompleted"));
        assert!(!kv.contains("todoItems"));
        assert!(!kv.contains("newItemText"));
    }

    #[test]
    fn undecodable_slots_fall_back_to_defaults() {
        let store = InMemoryStore::with_values([
            ("todoItems", "{not json"),
            ("newItemText", "\"kept\""),
            ("showCompleted", "\"yes\""),
        ]);

        let state = load_state(&store).unwrap();
        assert!(state.items.is_empty());
        assert_eq!(state.draft_text, "kept");
        assert!(!state.show_completed);
    }

    #[test]
    fn duplicate_ids_are_dropped_on_load() {
        let store = InMemoryStore::with_values([(
            "todoItems",
            r#"[
                {"id":"00000000-0000-0000-0000-000000000001","text":"A","completed":false},
                {"id":"00000000-0000-0000-0000-000000000001","text":"B","completed":true}
            ]"#,
        )]);

        let state = load_state(&store).unwrap();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].text, "A");
    }

    #[test]
    fn failed_writes_feed_back_one_action_per_slot() {
        let kv = Arc::new(FailingStore::new());
        let store: Arc<dyn KeyValueStore> = kv.clone();

        let feedback = block_on_effects([persist(&store, &sample_state(), &[Slot::Items, Slot::DraftText])]);

        assert_eq!(kv.attempts(), 2);
        let slots: Vec<Slot> = feedback
            .iter()
            .filter_map(|action| match action {
                TodoAction::PersistFailed { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect();
        assert_eq!(slots, vec![Slot::Items, Slot::DraftText]);
    }
}
