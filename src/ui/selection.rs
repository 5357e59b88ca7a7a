//! Query, selection index and the last applied result set.
//!
//! [`SelectionModel`] is plain data owned by the search session. It never
//! talks to the network; the session feeds it replies and input deltas.

use crate::search::protocol::SearchReply;

/// Matches beyond this many are dropped before display.
pub const MAX_DISPLAYED_MATCHES: usize = 9;

/// Suffix of the synthetic row offered when no note is named exactly like the query.
pub const CREATE_MARKER: &str = "[[Create New Note]]";

/// Queries starting with this prefix are local commands and never hit the server.
pub const LOCAL_COMMAND_PREFIX: char = ':';

/// Local command that quits on Enter.
pub const QUIT_COMMAND: &str = ":q";

pub fn is_local_command(query: &str) -> bool {
    query.starts_with(LOCAL_COMMAND_PREFIX)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredMatch {
    pub name: String,
    pub score: f64,
}

/// Server matches plus the optional synthetic "create" row, in display order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayedMatches {
    matches: Vec<ScoredMatch>,
    /// Query text of the synthetic row, if one is shown.
    create: Option<String>,
    is_more: bool,
}

impl DisplayedMatches {
    /// Apply truncation and the synthetic-entry rule to a server reply.
    ///
    /// The synthetic row is appended only when the query is non-empty and no
    /// returned name equals it verbatim. Server order is kept as-is.
    pub fn from_reply(query: &str, reply: &SearchReply) -> Self {
        let matches: Vec<ScoredMatch> = reply
            .ranked()
            .take(MAX_DISPLAYED_MATCHES)
            .map(|(name, score)| ScoredMatch {
                name: name.to_string(),
                score,
            })
            .collect();

        let exact = matches.iter().any(|m| m.name == query);
        let create = (!exact && !query.is_empty()).then(|| query.to_string());

        Self {
            matches,
            create,
            is_more: reply.is_more || reply.matched_basenames.len() > MAX_DISPLAYED_MATCHES,
        }
    }

    pub fn len(&self) -> usize {
        self.matches.len() + usize::from(self.create.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn matches(&self) -> &[ScoredMatch] {
        &self.matches
    }

    pub fn has_create_entry(&self) -> bool {
        self.create.is_some()
    }

    pub fn is_more(&self) -> bool {
        self.is_more
    }

    /// Row labels as the table shows them.
    pub fn labels(&self) -> Vec<String> {
        let mut rows: Vec<String> = self.matches.iter().map(|m| m.name.clone()).collect();
        if let Some(query) = &self.create {
            rows.push(create_label(query));
        }
        rows
    }
}

pub fn create_label(query: &str) -> String {
    format!("{query} {CREATE_MARKER}")
}

/// Current query, selection and the results last applied for it.
#[derive(Clone, Debug, Default)]
pub struct SelectionModel {
    query: String,
    selected_index: usize,
    displayed: DisplayedMatches,
    selected_name: String,
    selected_content: String,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn displayed(&self) -> &DisplayedMatches {
        &self.displayed
    }

    pub fn selected_name(&self) -> &str {
        &self.selected_name
    }

    pub fn selected_content(&self) -> &str {
        &self.selected_content
    }

    /// Move the selection by `delta`, clamped to `[0, len(displayed)]`.
    ///
    /// The upper bound is the list length, one past the last row.
    pub fn adjust_index(&mut self, delta: isize) {
        let upper = self.displayed.len() as isize;
        let next = (self.selected_index as isize).saturating_add(delta);
        self.selected_index = next.clamp(0, upper) as usize;
    }

    /// Replace the query. The selection survives unless it no longer fits.
    pub fn reset(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.reset_index_if_out_of_range();
    }

    /// Drop the selected name and preview but keep the rows. Called whenever
    /// a new search goes out.
    pub fn clear_selection(&mut self) {
        self.selected_name.clear();
        self.selected_content.clear();
    }

    /// Forget everything shown, used for local `:` commands.
    pub fn clear_results(&mut self) {
        self.displayed = DisplayedMatches::default();
        self.selected_name.clear();
        self.selected_content.clear();
    }

    /// Reconcile a server reply for `query` into the visible state.
    pub fn apply_reply(&mut self, query: &str, reply: SearchReply) {
        self.displayed = DisplayedMatches::from_reply(query, &reply);
        self.reset_index_if_out_of_range();
        self.selected_name = self.derive_selected_name(query);
        self.selected_content = reply.selected_content;
    }

    /// Name to open on confirm: the selected note, or the query for the
    /// synthetic row.
    pub fn name_to_open(&self) -> &str {
        if self.selected_name.is_empty() {
            &self.query
        } else {
            &self.selected_name
        }
    }

    fn reset_index_if_out_of_range(&mut self) {
        if self.selected_index >= self.displayed.len() {
            self.selected_index = 0;
        }
    }

    fn derive_selected_name(&self, query: &str) -> String {
        if self.displayed.is_empty() {
            return String::new();
        }
        match self.displayed.matches().get(self.selected_index) {
            Some(hit) => hit.name.clone(),
            None => query.to_string(),
        }
    }
}
