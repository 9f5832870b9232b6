//! What the list shows, recomputed from state on every render.

use crate::types::{ItemId, TodoItem, TodoState};
use std::collections::BTreeSet;

/// Which control receives typed keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    /// The new-item text field
    #[default]
    Input,
    /// The item list
    List,
}

impl Focus {
    /// The other control
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Input => Self::List,
            Self::List => Self::Input,
        }
    }
}

/// A displayed row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Row<'a> {
    /// Position of the item in `TodoState::items`
    pub position: usize,
    /// The item itself
    pub item: &'a TodoItem,
}

/// Rows to display: every item, minus completed ones unless `show_completed`
#[must_use]
pub fn visible_rows(state: &TodoState) -> Vec<Row<'_>> {
    state
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| state.show_completed || !item.completed)
        .map(|(position, item)| Row { position, item })
        .collect()
}

/// Widget-local state: focus, cursor, and rows marked for deletion
///
/// Never persisted and never sent to the store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Control receiving keys
    pub focus: Focus,
    /// Index into the visible rows
    pub cursor: usize,
    /// Items marked for deletion
    pub marked: BTreeSet<ItemId>,
}

impl ViewState {
    /// Bring the cursor and marks in line with `state`
    pub fn reconcile(&mut self, state: &TodoState) {
        let rows = visible_rows(state);
        self.clamp_cursor(rows.len());
        self.marked.retain(|id| state.contains(id));
    }

    /// Keep the cursor inside `row_count` rows
    pub const fn clamp_cursor(&mut self, row_count: usize) {
        if row_count == 0 {
            self.cursor = 0;
        } else if self.cursor >= row_count {
            self.cursor = row_count - 1;
        }
    }

    /// Move the cursor one row up
    pub const fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor one row down, stopping at the last of `row_count` rows
    pub const fn cursor_down(&mut self, row_count: usize) {
        if self.cursor + 1 < row_count {
            self.cursor += 1;
        }
    }

    /// The row under the cursor
    #[must_use]
    pub fn selected<'r, 'a>(&self, rows: &'r [Row<'a>]) -> Option<&'r Row<'a>> {
        rows.get(self.cursor)
    }

    /// Mark or unmark an item for deletion
    pub fn toggle_mark(&mut self, id: ItemId) {
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Positions to delete: the visible marked rows, or the cursor row if none are marked
    #[must_use]
    pub fn delete_positions(&self, rows: &[Row<'_>]) -> BTreeSet<usize> {
        let marked: BTreeSet<usize> = rows
            .iter()
            .filter(|row| self.marked.contains(&row.item.id))
            .map(|row| row.position)
            .collect();

        if marked.is_empty() {
            self.selected(rows).map(|row| row.position).into_iter().collect()
        } else {
            marked
        }
    }
}
