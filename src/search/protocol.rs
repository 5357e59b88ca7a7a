//! Wire types for the note index server.
//!
//! The server speaks JSON over plain HTTP: `POST /search` and `POST /delete`,
//! one request/response exchange each.

use serde::{Deserialize, Serialize};

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 38906;

/// Endpoint path for ranked lookups.
pub const SEARCH_ENDPOINT: &str = "search";

/// Endpoint path for note removal.
pub const DELETE_ENDPOINT: &str = "delete";

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub selected_index: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, selected_index: usize) -> Self {
        Self {
            query: query.into(),
            selected_index,
        }
    }
}

/// Body returned by `POST /search`.
///
/// `matched_basenames` is relevance-descending as ranked by the server and
/// `scores` is parallel to it. `selected_content` is the preview of the note
/// at `selected_index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReply {
    #[serde(default)]
    pub is_more: bool,
    #[serde(default)]
    pub matched_basenames: Vec<String>,
    #[serde(default)]
    pub scores: Vec<f64>,
    #[serde(default)]
    pub selected_content: String,
}

impl SearchReply {
    /// Match names paired with their scores. Missing scores read as 0.0.
    pub fn ranked(&self) -> impl Iterator<Item = (&str, f64)> {
        self.matched_basenames
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), self.scores.get(i).copied().unwrap_or(0.0)))
    }
}

/// Body of `POST /delete`. The response body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub note_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_request_uses_server_field_names() {
        let body = serde_json::to_value(SearchRequest::new("todo", 2)).unwrap();
        assert_eq!(body, serde_json::json!({"query": "todo", "selected_index": 2}));
    }

    #[test]
    fn reply_tolerates_missing_fields() {
        let reply: SearchReply = serde_json::from_str(r#"{"matched_basenames": ["a"]}"#).unwrap();
        assert_eq!(reply.matched_basenames, vec!["a"]);
        assert!(!reply.is_more);
        assert!(reply.selected_content.is_empty());
    }

    #[test]
    fn ranked_pairs_names_with_scores() {
        let reply = SearchReply {
            matched_basenames: vec!["todo".into(), "todolist".into(), "extra".into()],
            scores: vec![1.0, 0.5],
            ..Default::default()
        };
        let pairs: Vec<_> = reply.ranked().collect();
        assert_eq!(pairs, vec![("todo", 1.0), ("todolist", 0.5), ("extra", 0.0)]);
    }

    #[test]
    fn delete_request_shape() {
        let body = serde_json::to_string(&DeleteRequest {
            note_name: "groceries".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"note_name":"groceries"}"#);
    }
}
