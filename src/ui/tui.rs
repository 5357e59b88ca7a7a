//! Ratatui front-end for the search session.
//!
//! One thread owns the terminal: it polls crossterm for keys, feeds them to
//! the session, drains finished searches and redraws from a snapshot.

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::Config;
use crate::search::client::{HttpQueryClient, QueryClient};
use crate::ui::clipboard::{SystemClipboard, copy_status};
use crate::ui::components::theme::ThemePalette;
use crate::ui::components::widgets::query_bar;
use crate::ui::edit::{EditReport, NoteEditFlow, ProcessRunner, Suspend};
use crate::ui::input::{Outcome, command_for, dispatch};
use crate::ui::selection::CREATE_MARKER;
use crate::ui::session::{SearchSession, SessionSnapshot, SessionState};
use crate::ui::shortcuts;

pub fn footer_legend() -> String {
    format!(
        "{} open | {} move | {} delete | {} copy | {} clear | {} or {} quit",
        shortcuts::OPEN,
        shortcuts::NAVIGATE,
        shortcuts::DELETE,
        shortcuts::COPY,
        shortcuts::CLEAR_QUERY,
        shortcuts::QUIT,
        shortcuts::QUIT_COMMAND,
    )
}

pub fn run_tui(config: &Config, once: bool) -> Result<()> {
    if once
        && dotenvy::var("TUI_HEADLESS")
            .map(|v| v == "1")
            .unwrap_or(false)
    {
        return run_tui_headless(config);
    }

    let client = HttpQueryClient::new(config.server.clone(), config.request_timeout)?;
    let mut session = SearchSession::new(client, Handle::current());
    let edit_flow = NoteEditFlow::new(&config.meta_dir, config.editor.clone());
    let palette = config.theme.palette();

    let mut terminal = TerminalSession::enter()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "interactive session started"
    );

    // Show whatever the server ranks for an empty query before any typing.
    session.dispatch();
    let result = event_loop(&mut terminal, &mut session, &edit_flow, palette, once);
    drop(terminal);
    info!("interactive session ended");
    result
}

fn event_loop<C: QueryClient>(
    terminal: &mut TerminalSession,
    session: &mut SearchSession<C>,
    edit_flow: &NoteEditFlow,
    palette: ThemePalette,
    once: bool,
) -> Result<()> {
    let tick_rate = Duration::from_millis(30);
    let mut clipboard = SystemClipboard::new();
    let mut needs_draw = true;

    loop {
        needs_draw |= session.pump();
        if needs_draw {
            // Always drawn from the model, so the highlighted row tracks the
            // session's index after every key.
            let snapshot = session.snapshot();
            terminal.draw(|f| render(f, &snapshot, palette))?;
            needs_draw = false;
        }
        if once {
            return Ok(());
        }

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                needs_draw = true;
                match dispatch(session, command_for(key)) {
                    Outcome::Continue => {}
                    Outcome::Quit => return Ok(()),
                    Outcome::OpenNote(note) => {
                        match edit_flow.open(&note, terminal, &mut ProcessRunner) {
                            Ok(EditReport::Edited(path)) => {
                                info!(path = %path.display(), "editor closed");
                                session.set_status(format!("Edited {}", note.name));
                            }
                            Ok(EditReport::Opened(path)) => {
                                session.set_status(format!("Opened {}", path.display()));
                            }
                            Err(err) => {
                                warn!("open failed: {err}");
                                session.set_status(format!("Open failed: {err}"));
                            }
                        }
                    }
                    Outcome::CopyToClipboard(text) => {
                        let result = clipboard.copy(&text);
                        if let Err(err) = &result {
                            warn!("{err}");
                        }
                        session.set_status(copy_status(&text, &result));
                    }
                }
            }
            Event::Resize(_, _) => needs_draw = true,
            _ => {}
        }
    }
}

pub fn render(frame: &mut Frame, snapshot: &SessionSnapshot, palette: ThemePalette) {
    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // query
            Constraint::Percentage(40), // matches
            Constraint::Min(0),         // preview
            Constraint::Length(1),      // status / footer
        ])
        .split(frame.area());

    frame.render_widget(
        query_bar(&snapshot.query, palette, snapshot.state),
        chunks[0],
    );

    let items: Vec<ListItem> = snapshot
        .rows
        .iter()
        .map(|row| {
            if row.ends_with(CREATE_MARKER) {
                ListItem::new(row.clone()).style(palette.create_style())
            } else {
                ListItem::new(row.clone())
            }
        })
        .collect();
    let title = if snapshot.is_more {
        "Notes · more…"
    } else {
        "Notes"
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(Span::styled(title, palette.title()))
                .borders(Borders::ALL)
                .border_style(palette.border_style()),
        )
        .highlight_style(palette.selected_style())
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    if !snapshot.rows.is_empty() {
        state.select(Some(snapshot.selected.min(snapshot.rows.len() - 1)));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);

    let preview = if snapshot.preview.is_empty() && snapshot.state == SessionState::Searching {
        Paragraph::new("Searching…").style(palette.hint_style())
    } else {
        Paragraph::new(snapshot.preview.clone()).wrap(Wrap { trim: false })
    };
    frame.render_widget(
        preview.block(
            Block::default()
                .title(Span::styled("Preview", palette.title()))
                .borders(Borders::ALL)
                .border_style(palette.border_style()),
        ),
        chunks[2],
    );

    let footer = match &snapshot.status {
        Some(status) if status.contains("failed") => {
            Paragraph::new(status.clone()).style(palette.error_style())
        }
        Some(status) => Paragraph::new(status.clone()).style(palette.hint_style()),
        None => Paragraph::new(footer_legend()).style(palette.hint_style()),
    };
    frame.render_widget(footer, chunks[3]);
}

/// Dispatch a single empty-query search and wait for it to settle.
fn run_tui_headless(config: &Config) -> Result<()> {
    let client = HttpQueryClient::new(config.server.clone(), config.request_timeout)?;
    let mut session = SearchSession::new(client, Handle::current());
    session.dispatch();

    let deadline = Instant::now() + config.request_timeout + Duration::from_secs(1);
    loop {
        session.pump();
        if session.state() == SessionState::Displaying {
            break;
        }
        if Instant::now() > deadline {
            bail!("no reply from index server at {}", config.server.endpoint_url(""));
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    if let Some(status) = session.status() {
        bail!("{status}");
    }
    Ok(())
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen) {
            teardown_terminal();
            return Err(err.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout)).inspect_err(|_| {
            teardown_terminal();
        })?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Suspend for TerminalSession {
    fn suspended<R>(&mut self, action: impl FnOnce() -> R) -> io::Result<R> {
        let _guard = TerminalSuspendGuard::new(&mut self.terminal)?;
        Ok(action())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

/// Hands the terminal back to the shell until dropped.
struct TerminalSuspendGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalSuspendGuard<'a> {
    fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<Self> {
        terminal.show_cursor()?;
        disable_raw_mode()?;

        if let Err(err) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
            let _ = enable_raw_mode();
            let _ = execute!(terminal.backend_mut(), EnterAlternateScreen);
            let _ = terminal.hide_cursor();
            return Err(err);
        }
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSuspendGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.clear();
        let _ = self.terminal.hide_cursor();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn screen_text(snapshot: &SessionSnapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal
            .draw(|f| render(f, snapshot, ThemePalette::dark()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            query: "tod".into(),
            rows: vec!["todo".into(), "tod [[Create New Note]]".into()],
            selected: 0,
            preview: "buy milk".into(),
            state: SessionState::Displaying,
            is_more: false,
            status: None,
        }
    }

    #[test]
    fn renders_query_rows_and_preview() {
        let text = screen_text(&snapshot());
        assert!(text.contains("tod"));
        assert!(text.contains("▶ todo"));
        assert!(text.contains("[[Create New Note]]"));
        assert!(text.contains("buy milk"));
        assert!(text.contains("Enter open"));
    }

    #[test]
    fn status_replaces_footer() {
        let snap = SessionSnapshot {
            status: Some("Search failed: index server unreachable".into()),
            ..snapshot()
        };
        let text = screen_text(&snap);
        assert!(text.contains("Search failed"));
        assert!(!text.contains("Enter open"));
    }

    #[test]
    fn selection_past_last_row_highlights_last_row() {
        let snap = SessionSnapshot {
            selected: 2,
            ..snapshot()
        };
        let text = screen_text(&snap);
        assert!(text.contains("▶ tod [[Create"));
    }

    #[test]
    fn pending_search_shows_placeholder() {
        let snap = SessionSnapshot {
            preview: String::new(),
            state: SessionState::Searching,
            ..snapshot()
        };
        assert!(screen_text(&snap).contains("Searching…"));
    }

    #[test]
    fn more_marker_in_title() {
        let snap = SessionSnapshot {
            is_more: true,
            ..snapshot()
        };
        assert!(screen_text(&snap).contains("Notes · more…"));
    }

    #[test]
    fn footer_lists_every_action() {
        let legend = footer_legend();
        for key in ["Enter", "Ctrl-K", "Ctrl-X", "Ctrl-D", ":q"] {
            assert!(legend.contains(key), "footer should mention {key}");
        }
    }
}
