//! Diluvium Core - Client-side core for a Deluge BitTorrent daemon
//!
//! This crate provides the non-UI building blocks of a Deluge web front end:
//! a JSON-RPC-over-HTTP transport, a polling sync engine that keeps a local
//! snapshot of daemon state fresh, and a deterministic NFO report generator.

pub mod config;
pub mod report;
pub mod rpc;
pub mod sync;

// Re-export main types for convenient access
pub use config::DiluviumConfig;
pub use report::{ReportInput, TemplateId, generate};
pub use rpc::{DelugeRpcClient, RpcError, RpcTransport};
pub use sync::{SyncEngine, SyncSnapshot, TorrentAction, TorrentState, TorrentStatus};

/// Core errors that can bubble up from any Diluvium subsystem.
///
/// High-level error types representing failures in core functionality.
#[derive(Debug, thiserror::Error)]
pub enum DiluviumError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiluviumError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            DiluviumError::Rpc(e) => match e {
                RpcError::Timeout { seconds } => {
                    format!("Daemon did not respond within {seconds} seconds")
                }
                RpcError::Http { status, .. } => {
                    format!("Daemon returned HTTP status {status}")
                }
                RpcError::Daemon { message, .. } => message.clone(),
                RpcError::Network { .. } => "Could not reach the daemon".to_string(),
                RpcError::MalformedResponse { .. } => {
                    "Daemon returned an unexpected response".to_string()
                }
            },
            DiluviumError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
            DiluviumError::Io(_) => "File system error occurred".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DiluviumError>;
