//! Key events to session operations.
//!
//! [`command_for`] is a pure mapping from a crossterm key to a [`Command`];
//! [`dispatch`] applies the command to the session and tells the terminal
//! loop what side effect, if any, it has to perform.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::search::client::QueryClient;
use crate::ui::edit::NoteHandoff;
use crate::ui::selection::QUIT_COMMAND;
use crate::ui::session::SearchSession;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Insert(char),
    Backspace,
    ClearLine,
    Navigate(isize),
    Confirm,
    Delete,
    Copy,
    Quit,
    Ignore,
}

/// What the terminal loop should do after a command was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    OpenNote(NoteHandoff),
    CopyToClipboard(String),
}

pub fn command_for(key: KeyEvent) -> Command {
    if key.kind != KeyEventKind::Press {
        return Command::Ignore;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('d') if ctrl => Command::Quit,
        KeyCode::Char('c') if ctrl => Command::Quit,
        KeyCode::Char('k') if ctrl => Command::Delete,
        KeyCode::Char('x') if ctrl => Command::Copy,
        KeyCode::Char('u') if ctrl => Command::ClearLine,
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => Command::Ignore,
        KeyCode::Char(c) => Command::Insert(c),
        KeyCode::Backspace => Command::Backspace,
        KeyCode::Down => Command::Navigate(1),
        KeyCode::Up => Command::Navigate(-1),
        KeyCode::Enter => Command::Confirm,
        KeyCode::Esc => Command::Quit,
        _ => Command::Ignore,
    }
}

pub fn dispatch<C: QueryClient>(session: &mut SearchSession<C>, command: Command) -> Outcome {
    match command {
        Command::Insert(c) => {
            let mut query = session.model().query().to_string();
            query.push(c);
            session.on_query_changed(query);
            Outcome::Continue
        }
        Command::Backspace => {
            let mut query = session.model().query().to_string();
            if query.pop().is_some() {
                session.on_query_changed(query);
            }
            Outcome::Continue
        }
        Command::ClearLine => {
            if !session.model().query().is_empty() {
                session.on_query_changed(String::new());
            }
            Outcome::Continue
        }
        Command::Navigate(delta) => {
            session.navigate(delta);
            Outcome::Continue
        }
        Command::Confirm => confirm(session),
        Command::Delete => {
            session.delete_selected();
            Outcome::Continue
        }
        Command::Copy => {
            Outcome::CopyToClipboard(session.model().selected_content().to_string())
        }
        Command::Quit => Outcome::Quit,
        Command::Ignore => Outcome::Continue,
    }
}

fn confirm<C: QueryClient>(session: &mut SearchSession<C>) -> Outcome {
    let model = session.model();
    if model.query() == QUIT_COMMAND {
        return Outcome::Quit;
    }

    let name = model.name_to_open();
    if name.is_empty() {
        session.set_status("Type a note name first");
        return Outcome::Continue;
    }

    Outcome::OpenNote(NoteHandoff {
        name: name.to_string(),
        content: model.selected_content().to_string(),
    })
}
