//! Centralized configuration for Diluvium.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::time::Duration;

/// Central configuration for all Diluvium components.
///
/// Groups related configuration settings into logical sections.
#[derive(Debug, Clone, Default)]
pub struct DiluviumConfig {
    pub rpc: RpcConfig,
    pub poll: PollConfig,
}

/// JSON-RPC transport configuration.
///
/// Controls HTTP endpoints, request deadlines, and client identification
/// for all daemon communication.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Base URL of the daemon web interface, without a trailing slash
    pub base_url: String,
    /// Deadline for an ordinary RPC call
    pub call_timeout: Duration,
    /// Deadline for a torrent file upload
    pub upload_timeout: Duration,
    /// User agent for HTTP requests
    pub user_agent: &'static str,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8112".to_string(),
            call_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(60),
            user_agent: "diluvium/0.1.0",
        }
    }
}

/// Polling cadence and session accounting configuration.
///
/// Intervals are per logical query; the scheduler never issues a new
/// request for a query while a previous one for the same query is in
/// flight, regardless of interval.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval between torrent list and detail polls
    pub list_interval: Duration,
    /// Interval between daemon connectivity checks
    pub connectivity_interval: Duration,
    /// Interval for slow-changing queries such as the external IP
    pub slow_interval: Duration,
    /// Maximum elapsed time credited per session accumulator tick
    pub session_elapsed_cap: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            list_interval: Duration::from_secs(3),
            connectivity_interval: Duration::from_secs(10),
            slow_interval: Duration::from_secs(60),
            session_elapsed_cap: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = DiluviumConfig::default();
        assert_eq!(config.rpc.call_timeout, Duration::from_secs(30));
        assert_eq!(config.rpc.upload_timeout, Duration::from_secs(60));
        assert_eq!(config.poll.list_interval, Duration::from_secs(3));
        assert_eq!(config.poll.session_elapsed_cap, Duration::from_secs(10));
    }
}
