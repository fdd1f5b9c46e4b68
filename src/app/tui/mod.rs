mod actions;
mod render;
mod session;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;
use tracing::warn;

use crate::retry::RetryingStore;

use self::actions::{move_selection, refresh_items, status_error, status_info};
use self::render::draw_tui;
use self::session::TuiSession;

/// Full text of a journal shown over the dashboard until any key is pressed.
#[derive(Debug, Clone)]
pub(super) struct PendingNotice {
    pub(super) title: String,
    pub(super) message: String,
}

const PAGE: isize = 10;

pub(crate) fn run_tui(store: &mut RetryingStore, limit: usize) -> Result<()> {
    let mut items = store
        .run(|db| db.recent_journals(limit))
        .context("failed to load journals")?;

    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut table_state = TableState::default();
    table_state.select((!items.is_empty()).then_some(0));
    let mut pending_notice = None::<PendingNotice>;
    let mut status = if items.is_empty() {
        status_info("No journal entries yet. Run `gunluk write` first.")
    } else {
        status_info("Ready.")
    };

    loop {
        terminal.draw(|frame| {
            draw_tui(
                frame,
                &items,
                &mut table_state,
                &status,
                pending_notice.as_ref(),
            )
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if pending_notice.is_some() {
            pending_notice = None;
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('r') => {
                let keep = table_state
                    .selected()
                    .and_then(|idx| items.get(idx))
                    .map(|item| item.id);
                match refresh_items(store, limit, &mut items, &mut table_state, keep) {
                    Ok(()) => status = status_info(&format!("Loaded {} journals.", items.len())),
                    Err(err) => {
                        warn!(error = %err, "journal refresh failed");
                        status = status_error(&format!("Refresh failed: {err}"));
                    }
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                table_state.select(move_selection(table_state.selected(), items.len(), -1));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                table_state.select(move_selection(table_state.selected(), items.len(), 1));
            }
            KeyCode::PageUp => {
                table_state.select(move_selection(table_state.selected(), items.len(), -PAGE));
            }
            KeyCode::PageDown => {
                table_state.select(move_selection(table_state.selected(), items.len(), PAGE));
            }
            KeyCode::Enter => {
                let Some(item) = table_state.selected().and_then(|idx| items.get(idx)) else {
                    continue;
                };
                let message = if item.content.trim().is_empty() {
                    "(no text)".to_string()
                } else {
                    item.content.clone()
                };
                pending_notice = Some(PendingNotice {
                    title: item.date.clone(),
                    message,
                });
                status = status_info("Press any key to close.");
            }
            _ => {}
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}
