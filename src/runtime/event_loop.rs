use std::time::Duration;

use crossbeam::channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, error};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Page};
use crate::config;
use crate::events::Command;
use crate::listing::ListingError;
use crate::pipeline::{CancelToken, ListingPipeline};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: handles input and UI drawing. Returns `Ok(())`
/// when the user quits or cancellation was triggered elsewhere.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    loader: &ListingPipeline,
    commands: &Sender<Command>,
    cancel: &CancelToken,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        if cancel.is_cancelled() {
            debug!("cancellation observed, leaving the event loop");
            break;
        }

        if app.loading && loader.is_finished() {
            app.finish_loading();
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, settings.logging.color))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, commands, cancel, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn send(app: &mut App, commands: &Sender<Command>, command: Result<Command, ListingError>) {
    match command {
        Ok(command) => {
            app.set_status(command.to_string());
            if commands.send(command).is_err() {
                error!("event dispatcher is gone, dropping command");
            }
        }
        Err(err) => error!("cannot act on the selected row: {err}"),
    }
}

/// Apply one key press. Returns `true` when the UI should exit.
pub fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    commands: &Sender<Command>,
    cancel: &CancelToken,
    state: &mut EventLoopState,
) -> bool {
    // Raw mode swallows SIGINT.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        cancel.cancel();
        return true;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            cancel.cancel();
            return true;
        }
        KeyCode::F(1) => {
            state.pending_gg = false;
            app.show_page(Page::Listing);
        }
        KeyCode::F(2) => {
            state.pending_gg = false;
            app.show_page(Page::Logs);
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.go_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.go_bottom();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::PageDown => {
            state.pending_gg = false;
            app.page_down();
        }
        KeyCode::PageUp => {
            state.pending_gg = false;
            app.page_up();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            let command = app.play_selected();
            send(app, commands, command);
        }
        KeyCode::Char(' ') => {
            state.pending_gg = false;
            let command = app.queue_selected();
            send(app, commands, command);
        }
        KeyCode::Char('p') => {
            state.pending_gg = false;
            send(app, commands, Ok(Command::Toggle));
        }
        KeyCode::Char('f') => {
            state.pending_gg = false;
            send(app, commands, Ok(Command::PlayNext));
        }
        KeyCode::Char('b') => {
            state.pending_gg = false;
            send(app, commands, Ok(Command::PlayPrevious));
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
