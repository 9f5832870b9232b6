//! Key bindings.
//!
//! Keys are translated into reducer actions. Widget-local state (focus,
//! cursor, marks) is updated in place and never reaches the store.

use super::view::{visible_rows, Focus, ViewState};
use crate::types::{TodoAction, TodoState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What the event loop should do with a key press
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiCommand {
    /// Send an action to the store
    Dispatch(TodoAction),
    /// Leave the event loop
    Quit,
}

/// Translate a key event
///
/// Returns `None` for keys that only move focus or the cursor, and for
/// release and repeat events.
pub fn handle_key(key: KeyEvent, state: &TodoState, view: &mut ViewState) -> Option<UiCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return Some(UiCommand::Quit),
        KeyCode::Char('t') if ctrl => {
            return Some(UiCommand::Dispatch(TodoAction::SetShowCompleted {
                show: !state.show_completed,
            }));
        },
        KeyCode::Esc => return Some(UiCommand::Quit),
        KeyCode::Tab | KeyCode::BackTab => {
            view.focus = view.focus.toggled();
            return None;
        },
        _ => {},
    }

    match view.focus {
        Focus::Input => input_key(key, state, view),
        Focus::List => list_key(key, state, view),
    }
}

fn input_key(key: KeyEvent, state: &TodoState, view: &mut ViewState) -> Option<UiCommand> {
    match key.code {
        KeyCode::Enter => Some(UiCommand::Dispatch(TodoAction::AddItem)),
        KeyCode::Backspace => {
            let mut text = state.draft_text.clone();
            text.pop()?;
            Some(UiCommand::Dispatch(TodoAction::SetDraftText { text }))
        },
        KeyCode::Down => {
            view.focus = Focus::List;
            None
        },
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            let mut text = state.draft_text.clone();
            text.push(c);
            Some(UiCommand::Dispatch(TodoAction::SetDraftText { text }))
        },
        _ => None,
    }
}

fn list_key(key: KeyEvent, state: &TodoState, view: &mut ViewState) -> Option<UiCommand> {
    let rows = visible_rows(state);
    view.clamp_cursor(rows.len());

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            view.cursor_up();
            None
        },
        KeyCode::Down | KeyCode::Char('j') => {
            view.cursor_down(rows.len());
            None
        },
        KeyCode::Char(' ') | KeyCode::Enter => {
            let row = view.selected(&rows)?;
            Some(UiCommand::Dispatch(TodoAction::ToggleCompleted { id: row.item.id }))
        },
        KeyCode::Char('m') => {
            let id = view.selected(&rows)?.item.id;
            view.toggle_mark(id);
            None
        },
        KeyCode::Char('d') | KeyCode::Delete => {
            let positions = view.delete_positions(&rows);
            if positions.is_empty() {
                return None;
            }
            view.marked.clear();
            Some(UiCommand::Dispatch(TodoAction::DeleteItems { positions }))
        },
        KeyCode::Char('a' | 'i') => {
            view.focus = Focus::Input;
            None
        },
        KeyCode::Char('q') => Some(UiCommand::Quit),
        _ => None,
    }
}
