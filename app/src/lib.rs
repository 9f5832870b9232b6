//! # Tasklist
//!
//! A single-screen terminal task list.
//!
//! Items can be added from a text field, marked completed, and deleted.
//! Completed items are hidden unless "show completed" is on. The item list,
//! the draft text and the filter flag are written to a key-value store after
//! every change and once more on exit, then restored on the next start.
//!
//! ## Layout
//!
//! - [`types`]: items, state, actions and persistence slots
//! - [`reducer`]: state transitions and the writes they trigger
//! - [`persistence`]: slot encoding, loading and write effects
//! - [`session`]: startup load, exit flush and termination signals
//! - [`ui`]: the ratatui front end
//! - [`config`]: environment-driven settings

pub mod config;
pub mod persistence;
pub mod reducer;
pub mod session;
pub mod types;
pub mod ui;

pub use config::Config;
pub use reducer::{TodoEnvironment, TodoReducer};
pub use session::Session;
pub use types::{ItemId, Slot, TodoAction, TodoItem, TodoState};

/// The store driving the task list
pub type TodoStore = tasklist_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
