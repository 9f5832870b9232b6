//! Drawing the screen.
//!
//! ```text
//! ┌ New item ──────────────── Enter: Add ┐
//! │Buy milk                              │
//! └──────────────────────────────────────┘
//!  [ ] Show completed items (Ctrl+T)
//! ┌ Todo List 1/3 ───────────────────────┐
//! │> [ ] Walk dog                        │
//! │  [x] Call mom                        │
//! └──────────────────────────────────────┘
//!  Tab: list  Enter: add  Esc: quit
//! ```

use super::view::{visible_rows, Focus, ViewState};
use crate::types::TodoState;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

const INPUT_HELP: &str = " Tab: list  Enter: add  Ctrl+T: show completed  Esc: quit";
const LIST_HELP: &str =
    " Tab: input  j/k: move  Space: toggle  m: mark  d: delete  Ctrl+T: show completed  q: quit";

/// Draw the whole screen
pub fn draw(frame: &mut Frame<'_>, state: &TodoState, view: &ViewState) {
    let [input_area, toggle_area, list_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_input(frame, input_area, state, view.focus == Focus::Input);
    draw_toggle(frame, toggle_area, state);
    draw_list(frame, list_area, state, view);

    let help = match view.focus {
        Focus::Input => INPUT_HELP,
        Focus::List => LIST_HELP,
    };
    frame.render_widget(Paragraph::new(help).dark_gray(), help_area);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::new().fg(Color::Cyan)
    } else {
        Style::new()
    }
}

fn draw_input(frame: &mut Frame<'_>, area: Rect, state: &TodoState, focused: bool) {
    let block = Block::bordered()
        .title(" New item ")
        .title_top(Line::from(" Enter: Add ").right_aligned())
        .border_style(border_style(focused));
    let inner = block.inner(area);
    let line = Line::from(state.draft_text.as_str());
    let width = u16::try_from(line.width()).unwrap_or(u16::MAX);

    frame.render_widget(Paragraph::new(line).block(block), area);

    if focused && inner.width > 0 {
        let x = inner.x.saturating_add(width.min(inner.width - 1));
        frame.set_cursor_position((x, inner.y));
    }
}

fn draw_toggle(frame: &mut Frame<'_>, area: Rect, state: &TodoState) {
    let line = Line::from(vec![
        Span::raw(" "),
        Span::raw(checkbox(state.show_completed)),
        Span::raw(" Show completed items (Ctrl+T)"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_list(frame: &mut Frame<'_>, area: Rect, state: &TodoState, view: &ViewState) {
    let focused = view.focus == Focus::List;
    let block = Block::bordered()
        .title(format!(" Todo List {}/{} ", state.completed_count(), state.count()))
        .border_style(border_style(focused));

    let rows = visible_rows(state);
    if rows.is_empty() {
        let hidden = state.count();
        let message = if hidden == 0 {
            "Nothing to do".to_string()
        } else {
            format!("{hidden} completed item(s) hidden")
        };
        frame.render_widget(Paragraph::new(message).dark_gray().block(block), area);
        return;
    }

    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| {
            let mark = if view.marked.contains(&row.item.id) { "*" } else { " " };
            let text_style = if row.item.completed {
                Style::new().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
            } else {
                Style::new()
            };
            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::raw(checkbox(row.item.completed)),
                Span::raw(" "),
                Span::styled(row.item.text.as_str(), text_style),
            ]))
        })
        .collect();

    let highlight = if focused {
        Style::new().add_modifier(Modifier::REVERSED)
    } else {
        Style::new()
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol(">");

    let mut list_state = ListState::default().with_selected(Some(view.cursor));
    frame.render_stateful_widget(list, area, &mut list_state);
}

const fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}
