//! JSON-RPC-over-HTTP transport for the Deluge daemon.
//!
//! The daemon exposes a single POST endpoint accepting `{id, method, params}`
//! bodies and a separate multipart endpoint for torrent file uploads. This
//! module provides the wire types, the error taxonomy, and the HTTP client.

pub mod client;
pub mod protocol;

pub use client::{DelugeRpcClient, HostEntry, HostStatus, RpcTransport};
pub use protocol::{RpcRequest, RpcResponse};

/// Errors that can occur during daemon communication.
///
/// Every failure mode is surfaced as a single normalized error carrying a
/// human-readable message; the transport never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    #[error("Daemon error: {message}")]
    Daemon { message: String, code: i64 },

    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl RpcError {
    /// Maps a reqwest failure onto the transport error taxonomy.
    ///
    /// Timeouts are kept distinct from other network failures so callers
    /// can tell an unresponsive daemon apart from an unreachable one.
    pub(crate) fn from_request_error(error: reqwest::Error, deadline_secs: u64) -> Self {
        if error.is_timeout() {
            RpcError::Timeout {
                seconds: deadline_secs,
            }
        } else {
            RpcError::Network {
                reason: error.to_string(),
            }
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        RpcError::MalformedResponse {
            reason: reason.into(),
        }
    }
}
