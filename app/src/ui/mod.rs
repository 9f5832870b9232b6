//! Terminal front end.
//!
//! The event loop redraws from store state whenever the store's revision
//! changes or the terminal is resized, and forwards key presses to the
//! store through [`input::handle_key`]. It returns when the user quits or
//! `shutdown` resolves; flushing is left to the caller.

pub mod input;
pub mod render;
pub mod view;

use crate::TodoStore;
use anyhow::Context;
use crossterm::event::{Event, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use input::UiCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::future::Future;
use std::io::{self, Stdout};
use tracing::{debug, info};
use view::ViewState;

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Take over the terminal and run the event loop until quit or `shutdown`
///
/// The terminal is restored even when the loop fails.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, events cannot be
/// read, or the store rejects an action.
pub async fn run<F>(store: &TodoStore, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let result = event_loop(&mut terminal, store, shutdown).await;
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

fn setup_terminal() -> io::Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut CrosstermTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

async fn event_loop<B, F>(terminal: &mut Terminal<B>, store: &TodoStore, shutdown: F) -> anyhow::Result<()>
where
    B: Backend,
    F: Future<Output = ()>,
{
    let mut view = ViewState::default();
    let mut changes = store.subscribe();
    let mut events = EventStream::new();
    tokio::pin!(shutdown);

    let mut dirty = true;
    loop {
        if dirty {
            redraw(terminal, store, &mut view).await?;
            dirty = false;
        }

        tokio::select! {
            () = &mut shutdown => {
                info!("Termination requested, leaving event loop");
                return Ok(());
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                dirty = true;
            }
            event = events.next() => {
                let Some(event) = event else {
                    debug!("Terminal event stream ended");
                    return Ok(());
                };
                match event.context("Failed to read terminal event")? {
                    Event::Key(key) => {
                        let command = store.state(|state| input::handle_key(key, state, &mut view)).await;
                        match command {
                            Some(UiCommand::Quit) => {
                                info!("Quit requested");
                                return Ok(());
                            },
                            Some(UiCommand::Dispatch(action)) => {
                                store.send(action).await.context("Store rejected action")?;
                                changes.borrow_and_update();
                            },
                            None => {},
                        }
                        dirty = true;
                    },
                    Event::Resize(..) => dirty = true,
                    _ => {},
                }
            }
        }
    }
}

async fn redraw<B: Backend>(
    terminal: &mut Terminal<B>,
    store: &TodoStore,
    view: &mut ViewState,
) -> anyhow::Result<()> {
    store
        .state(|state| {
            view.reconcile(state);
            terminal
                .draw(|frame| render::draw(frame, state, view))
                .map(|_| ())
        })
        .await
        .context("Failed to draw")
}
