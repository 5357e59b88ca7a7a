//! Shared test doubles for the session and input tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use tbrush::search::client::{ClientError, QueryClient};
use tbrush::search::protocol::{SearchReply, SearchRequest};
use tbrush::ui::session::{SearchSession, SessionState};

/// In-memory note index: substring match, ranked by insertion order.
#[allow(dead_code)]
#[derive(Default)]
pub struct StaticClient {
    notes: Mutex<Vec<(String, String)>>,
    pub searches: AtomicUsize,
    pub deletes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StaticClient {
    pub fn with_notes(notes: &[(&str, &str)]) -> Self {
        Self {
            notes: Mutex::new(
                notes
                    .iter()
                    .map(|(name, body)| (name.to_string(), body.to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

impl QueryClient for StaticClient {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchReply, ClientError>> + Send {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let hits: Vec<(String, String)> = self
            .notes
            .lock()
            .iter()
            .filter(|(name, _)| name.contains(&request.query))
            .cloned()
            .collect();
        let reply = SearchReply {
            is_more: false,
            scores: (0..hits.len()).map(|i| 1.0 / (i as f64 + 1.0)).collect(),
            selected_content: hits
                .get(request.selected_index)
                .map(|(_, body)| body.clone())
                .unwrap_or_default(),
            matched_basenames: hits.into_iter().map(|(name, _)| name).collect(),
        };
        async move { Ok(reply) }
    }

    fn delete(&self, note_name: String) -> impl Future<Output = Result<(), ClientError>> + Send {
        self.notes.lock().retain(|(name, _)| *name != note_name);
        self.deletes.lock().push(note_name);
        async { Ok(()) }
    }
}

/// Search replies held back until the test releases them, keyed by query.
#[allow(dead_code)]
#[derive(Default)]
pub struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl GatedClient {
    /// Register a gate for `query`; send on the returned handle to answer.
    pub fn gate(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(query.to_string(), rx);
        tx
    }
}

impl QueryClient for GatedClient {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchReply, ClientError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().remove(&request.query);
        async move {
            match gate {
                Some(rx) => Ok(rx.await.unwrap_or_default()),
                None => Ok(SearchReply::default()),
            }
        }
    }

    fn delete(&self, _note_name: String) -> impl Future<Output = Result<(), ClientError>> + Send {
        async { Ok(()) }
    }
}

#[allow(dead_code)]
pub fn reply(names: &[&str], content: &str) -> SearchReply {
    SearchReply {
        is_more: false,
        matched_basenames: names.iter().map(|s| s.to_string()).collect(),
        scores: names.iter().map(|_| 1.0).collect(),
        selected_content: content.to_string(),
    }
}

/// Apply completions until nothing is in flight.
#[allow(dead_code)]
pub async fn settle<C: QueryClient>(session: &mut SearchSession<C>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while session.state() == SessionState::Searching {
            let event = session.next_event().await.expect("session channel open");
            session.reconcile(event);
        }
    })
    .await
    .expect("session settled");
}
