//! Client side of the note index server.
//!
//! - **[`protocol`]**: JSON bodies for `/search` and `/delete`.
//! - **[`client`]**: the [`client::QueryClient`] seam and its HTTP implementation.

pub mod client;
pub mod protocol;
