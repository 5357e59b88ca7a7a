//! Request/response wrapper around the note index server.
//!
//! [`QueryClient`] is the seam the interactive session talks to; the HTTP
//! implementation is [`HttpQueryClient`]. Failures come back as
//! [`ClientError`] values so a single bad search never takes the session down.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::protocol::{
    DELETE_ENDPOINT, DEFAULT_HOST, DEFAULT_PORT, DeleteRequest, SEARCH_ENDPOINT, SearchReply,
    SearchRequest,
};

/// Timeout for a single request to the index server.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors surfaced by the index server client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("index server unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("index server returned HTTP {status} for /{endpoint}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("malformed response from /{endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Search and delete calls against the note index.
///
/// Implementations must be shareable across tasks: the session clones an
/// `Arc` of the client into every dispatched request.
pub trait QueryClient: Send + Sync + 'static {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchReply, ClientError>> + Send;

    fn delete(&self, note_name: String) -> impl Future<Output = Result<(), ClientError>> + Send;
}

/// Where the index server lives.
#[derive(Debug, Clone)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
}

impl Default for ServerAddr {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerAddr {
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("http://{}:{}/{}", self.host, self.port, endpoint)
    }
}

/// JSON-over-HTTP client for the index server.
#[derive(Debug, Clone)]
pub struct HttpQueryClient {
    addr: ServerAddr,
    http: Client,
}

impl HttpQueryClient {
    pub fn new(addr: ServerAddr, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tbrush/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { addr, http })
    }

    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: &'static str,
        payload: &T,
    ) -> Result<String, ClientError> {
        let url = self.addr.endpoint_url(endpoint);
        let start = Instant::now();
        let response = self.http.post(&url).json(payload).send().await?;
        debug!(
            endpoint,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "post time"
        );

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(endpoint, bytes = body.len(), "response received");
        Ok(body)
    }
}

impl QueryClient for HttpQueryClient {
    fn search(
        &self,
        request: SearchRequest,
    ) -> impl Future<Output = Result<SearchReply, ClientError>> + Send {
        async move {
            let body = self.post(SEARCH_ENDPOINT, &request).await?;
            serde_json::from_str(&body).map_err(|source| ClientError::Decode {
                endpoint: SEARCH_ENDPOINT,
                source,
            })
        }
    }

    fn delete(&self, note_name: String) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move {
            self.post(DELETE_ENDPOINT, &DeleteRequest { note_name })
                .await
                .map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_joins_host_port_and_path() {
        let addr = ServerAddr {
            host: "127.0.0.1".into(),
            port: 4000,
        };
        assert_eq!(addr.endpoint_url("search"), "http://127.0.0.1:4000/search");
    }

    #[test]
    fn default_addr_targets_local_server() {
        let addr = ServerAddr::default();
        assert_eq!(addr.endpoint_url("delete"), "http://localhost:38906/delete");
    }

    #[test]
    fn errors_name_the_endpoint() {
        let err = ClientError::Status {
            endpoint: SEARCH_ENDPOINT,
            status: 502,
        };
        assert_eq!(err.to_string(), "index server returned HTTP 502 for /search");

        let decode = ClientError::Decode {
            endpoint: SEARCH_ENDPOINT,
            source: serde_json::from_str::<SearchReply>("not json").unwrap_err(),
        };
        assert!(decode.to_string().starts_with("malformed response from /search"));
    }
}
