//! Interactive search session.
//!
//! Every input event mutates the [`SelectionModel`] synchronously on the UI
//! thread and then dispatches a search on the tokio runtime. Completed
//! requests come back as [`SessionEvent`]s over a channel and are reconciled
//! on the UI thread again, so the model has a single writer.
//!
//! Searches are never cancelled. Each one carries a sequence number and only
//! the reply to the most recently dispatched search is applied; older replies
//! are dropped when they arrive.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::search::client::{ClientError, QueryClient};
use crate::search::protocol::{SearchReply, SearchRequest};
use crate::ui::selection::{SelectionModel, is_local_command};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing dispatched yet.
    Idle,
    /// A search is in flight for the current query.
    Searching,
    /// The latest reply (or local command) has been applied.
    Displaying,
}

/// Query and selection captured when a search is dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub query: String,
    pub selected_index: usize,
}

impl SearchTicket {
    pub fn request(&self) -> SearchRequest {
        SearchRequest::new(self.query.clone(), self.selected_index)
    }
}

/// Completion messages handed back to the UI thread.
#[derive(Debug)]
pub enum SessionEvent {
    SearchFinished {
        ticket: SearchTicket,
        result: Result<SearchReply, ClientError>,
    },
    DeleteFinished {
        note_name: String,
        result: Result<(), ClientError>,
    },
}

/// Immutable view of the session handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub query: String,
    pub rows: Vec<String>,
    pub selected: usize,
    pub preview: String,
    pub state: SessionState,
    pub is_more: bool,
    pub status: Option<String>,
}

pub struct SearchSession<C: QueryClient> {
    client: Arc<C>,
    runtime: Handle,
    model: SelectionModel,
    state: SessionState,
    latest_seq: u64,
    status: Option<String>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
}

impl<C: QueryClient> SearchSession<C> {
    pub fn new(client: C, runtime: Handle) -> Self {
        Self::with_shared_client(Arc::new(client), runtime)
    }

    pub fn with_shared_client(client: Arc<C>, runtime: Handle) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            client,
            runtime,
            model: SelectionModel::new(),
            state: SessionState::Idle,
            latest_seq: 0,
            status: None,
            events_tx,
            events_rx,
        }
    }

    pub fn model(&self) -> &SelectionModel {
        &self.model
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sequence number of the most recently dispatched search.
    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Text input changed.
    pub fn on_query_changed(&mut self, query: impl Into<String>) {
        self.model.reset(query);
        self.dispatch();
    }

    /// Up/Down navigation. Ignored while nothing is displayed.
    pub fn navigate(&mut self, delta: isize) {
        if self.model.displayed().is_empty() {
            return;
        }
        self.model.adjust_index(delta);
        self.dispatch();
    }

    /// Blank the preview and selected name, then send a search for the
    /// current query and selection. Local `:` commands are applied
    /// immediately instead.
    pub fn dispatch(&mut self) {
        if let Some(ticket) = self.begin_search() {
            self.spawn_search(ticket);
        }
    }

    /// Synchronous half of [`dispatch`](Self::dispatch): bumps the sequence
    /// number and updates the model. Returns the ticket to send, or `None`
    /// when the query is a local command and nothing goes over the network.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        self.latest_seq += 1;
        // The name belongs to the previous reply until the new one lands.
        self.model.clear_selection();

        if is_local_command(self.model.query()) {
            self.model.clear_results();
            self.state = SessionState::Displaying;
            return None;
        }

        self.state = SessionState::Searching;
        Some(SearchTicket {
            seq: self.latest_seq,
            query: self.model.query().to_string(),
            selected_index: self.model.selected_index(),
        })
    }

    fn spawn_search(&self, ticket: SearchTicket) {
        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        debug!(seq = ticket.seq, query = %ticket.query, "dispatching search");
        self.runtime.spawn(async move {
            let result = client.search(ticket.request()).await;
            // Receiver gone means the session is shutting down.
            let _ = tx.send(SessionEvent::SearchFinished { ticket, result });
        });
    }

    /// Delete the selected note, then search again once the server answers.
    ///
    /// The preview and selected name are cleared right away so the deleted
    /// note is not shown while the follow-up search is pending.
    pub fn delete_selected(&mut self) {
        let note_name = self.model.selected_name().to_string();
        if note_name.is_empty() {
            self.set_status("Nothing selected to delete");
            return;
        }

        // Searches already in flight would bring the deleted note back.
        self.latest_seq += 1;
        self.model.clear_selection();
        self.state = SessionState::Searching;

        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        info!(note = %note_name, "deleting note");
        self.runtime.spawn(async move {
            let result = client.delete(note_name.clone()).await;
            let _ = tx.send(SessionEvent::DeleteFinished { note_name, result });
        });
    }

    /// Apply a completion. Returns true when the view needs a redraw.
    pub fn reconcile(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::SearchFinished { ticket, result } => self.finish_search(ticket, result),
            SessionEvent::DeleteFinished { note_name, result } => {
                match result {
                    Ok(()) => self.set_status(format!("Deleted {note_name}")),
                    Err(err) => {
                        warn!(note = %note_name, "delete failed: {err}");
                        self.set_status(format!("Delete failed: {err}"));
                    }
                }
                self.dispatch();
                true
            }
        }
    }

    fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchReply, ClientError>,
    ) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "dropping stale search reply"
            );
            return false;
        }

        let reply = match result {
            Ok(reply) => {
                self.status = None;
                reply
            }
            Err(err) => {
                warn!(query = %ticket.query, "search failed: {err}");
                self.set_status(format!("Search failed: {err}"));
                SearchReply::default()
            }
        };

        self.model.apply_reply(&ticket.query, reply);
        self.state = SessionState::Displaying;
        true
    }

    /// Drain completions that have arrived without blocking.
    pub fn pump(&mut self) -> bool {
        let mut redraw = false;
        while let Ok(event) = self.events_rx.try_recv() {
            redraw |= self.reconcile(event);
        }
        redraw
    }

    /// Wait for the next completion.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let displayed = self.model.displayed();
        SessionSnapshot {
            query: self.model.query().to_string(),
            rows: displayed.labels(),
            selected: self.model.selected_index(),
            preview: self.model.selected_content().to_string(),
            state: self.state,
            is_more: displayed.is_more(),
            status: self.status.clone(),
        }
    }
}
