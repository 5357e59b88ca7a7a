//! Key presses driven through `command_for` and `dispatch` against a fake index.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Handle;

use tbrush::search::client::QueryClient;
use tbrush::ui::edit::NoteHandoff;
use tbrush::ui::input::{Outcome, command_for, dispatch};
use tbrush::ui::session::{SearchSession, SessionState};

mod util;
use util::{GatedClient, StaticClient, reply, settle};

fn press<C: QueryClient>(session: &mut SearchSession<C>, code: KeyCode) -> Outcome {
    dispatch(session, command_for(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn ctrl<C: QueryClient>(session: &mut SearchSession<C>, c: char) -> Outcome {
    dispatch(
        session,
        command_for(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
    )
}

fn type_text<C: QueryClient>(session: &mut SearchSession<C>, text: &str) {
    for c in text.chars() {
        assert_eq!(press(session, KeyCode::Char(c)), Outcome::Continue);
    }
}

fn session_over(notes: &[(&str, &str)]) -> (Arc<StaticClient>, SearchSession<StaticClient>) {
    let client = Arc::new(StaticClient::with_notes(notes));
    let session = SearchSession::with_shared_client(Arc::clone(&client), Handle::current());
    (client, session)
}

#[tokio::test]
async fn exact_match_suppresses_create_entry() {
    let (_, mut session) = session_over(&[("todo", "buy milk"), ("todolist", "- a\n- b")]);
    type_text(&mut session, "todo");
    settle(&mut session).await;

    let snap = session.snapshot();
    assert_eq!(snap.rows, vec!["todo", "todolist"]);
    assert_eq!(snap.selected, 0);
    assert_eq!(session.model().selected_name(), "todo");
    assert_eq!(snap.preview, "buy milk");
}

#[tokio::test]
async fn no_match_offers_create_entry() {
    let (_, mut session) = session_over(&[("todo", "buy milk")]);
    type_text(&mut session, "zzz");
    settle(&mut session).await;

    assert_eq!(session.snapshot().rows, vec!["zzz [[Create New Note]]"]);
    assert_eq!(session.model().selected_name(), "zzz");

    match press(&mut session, KeyCode::Enter) {
        Outcome::OpenNote(NoteHandoff { name, content }) => {
            assert_eq!(name, "zzz");
            assert_eq!(content, "");
        }
        other => panic!("expected OpenNote, got {other:?}"),
    }
}

#[tokio::test]
async fn navigation_may_step_one_past_last_row() {
    let (_, mut session) = session_over(&[("a", ""), ("ab", ""), ("ac", "")]);
    type_text(&mut session, "a");
    settle(&mut session).await;
    assert_eq!(session.snapshot().rows.len(), 3);

    press(&mut session, KeyCode::Down);
    press(&mut session, KeyCode::Down);
    assert_eq!(session.model().selected_index(), 2);
    press(&mut session, KeyCode::Down);
    assert_eq!(session.model().selected_index(), 3);
    press(&mut session, KeyCode::Down);
    assert_eq!(session.model().selected_index(), 3);
}

#[tokio::test]
async fn navigation_never_goes_below_zero() {
    let (_, mut session) = session_over(&[("b1", ""), ("b2", "")]);
    type_text(&mut session, "b");
    settle(&mut session).await;

    press(&mut session, KeyCode::Up);
    assert_eq!(session.model().selected_index(), 0);
}

#[tokio::test]
async fn quit_command_exits_without_network() {
    let (client, mut session) = session_over(&[("q", "")]);
    type_text(&mut session, ":q");
    assert_eq!(press(&mut session, KeyCode::Enter), Outcome::Quit);
    assert_eq!(client.search_count(), 0);
}

#[tokio::test]
async fn enter_opens_selected_note_with_preview() {
    let (_, mut session) = session_over(&[("journal", "day one"), ("jokes", "knock knock")]);
    type_text(&mut session, "j");
    settle(&mut session).await;
    press(&mut session, KeyCode::Down);
    settle(&mut session).await;

    assert_eq!(
        press(&mut session, KeyCode::Enter),
        Outcome::OpenNote(NoteHandoff {
            name: "jokes".into(),
            content: "knock knock".into(),
        })
    );
}

#[tokio::test]
async fn enter_with_nothing_typed_only_sets_status() {
    let (_, mut session) = session_over(&[]);
    assert_eq!(press(&mut session, KeyCode::Enter), Outcome::Continue);
    assert_eq!(session.status(), Some("Type a note name first"));
}

#[tokio::test]
async fn ctrl_x_copies_preview() {
    let (_, mut session) = session_over(&[("recipe", "flour, water")]);
    type_text(&mut session, "recipe");
    settle(&mut session).await;
    assert_eq!(
        ctrl(&mut session, 'x'),
        Outcome::CopyToClipboard("flour, water".into())
    );
}

#[tokio::test]
async fn ctrl_k_deletes_selected_note() {
    let (client, mut session) = session_over(&[("draft", "wip"), ("drafts-old", "")]);
    type_text(&mut session, "draft");
    settle(&mut session).await;

    assert_eq!(ctrl(&mut session, 'k'), Outcome::Continue);
    settle(&mut session).await;

    assert_eq!(*client.deletes.lock(), vec!["draft".to_string()]);
    assert_eq!(
        session.snapshot().rows,
        vec!["drafts-old", "draft [[Create New Note]]"]
    );
}

#[tokio::test]
async fn editing_keys_rewrite_the_query() {
    let (_, mut session) = session_over(&[]);
    type_text(&mut session, "abc");
    press(&mut session, KeyCode::Backspace);
    assert_eq!(session.model().query(), "ab");

    ctrl(&mut session, 'u');
    assert_eq!(session.model().query(), "");
    settle(&mut session).await;
    assert!(session.snapshot().rows.is_empty());
}

#[tokio::test]
async fn escape_and_ctrl_d_quit() {
    let (_, mut session) = session_over(&[]);
    assert_eq!(press(&mut session, KeyCode::Esc), Outcome::Quit);
    assert_eq!(ctrl(&mut session, 'd'), Outcome::Quit);
}

/// Rows `alpha`, `avocado` applied, then Down with the next reply held back.
async fn moved_while_searching() -> (
    Arc<GatedClient>,
    SearchSession<GatedClient>,
    tokio::sync::oneshot::Sender<tbrush::search::protocol::SearchReply>,
) {
    let client = Arc::new(GatedClient::default());
    let first = client.gate("a");
    let mut session = SearchSession::with_shared_client(Arc::clone(&client), Handle::current());
    type_text(&mut session, "a");
    first.send(reply(&["alpha", "avocado"], "first")).unwrap();
    settle(&mut session).await;
    assert_eq!(session.model().selected_name(), "alpha");

    let held = client.gate("a");
    press(&mut session, KeyCode::Down);
    assert_eq!(session.model().selected_index(), 1);
    assert_eq!(session.state(), SessionState::Searching);
    (client, session, held)
}

#[tokio::test]
async fn enter_before_reply_does_not_open_previous_row() {
    let (_client, mut session, held) = moved_while_searching().await;

    assert_eq!(
        press(&mut session, KeyCode::Enter),
        Outcome::OpenNote(NoteHandoff {
            name: "a".into(),
            content: String::new(),
        })
    );

    held.send(reply(&["alpha", "avocado"], "second")).unwrap();
    settle(&mut session).await;
    assert_eq!(session.model().selected_name(), "avocado");
    assert_eq!(
        press(&mut session, KeyCode::Enter),
        Outcome::OpenNote(NoteHandoff {
            name: "avocado".into(),
            content: "second".into(),
        })
    );
}

#[tokio::test]
async fn ctrl_k_before_reply_deletes_nothing() {
    let (_client, mut session, held) = moved_while_searching().await;

    assert_eq!(ctrl(&mut session, 'k'), Outcome::Continue);
    assert_eq!(session.status(), Some("Nothing selected to delete"));

    held.send(reply(&["alpha", "avocado"], "second")).unwrap();
    settle(&mut session).await;
    assert_eq!(session.model().selected_name(), "avocado");
    assert_eq!(session.snapshot().preview, "second");
}
