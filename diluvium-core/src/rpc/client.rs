//! HTTP implementation of the daemon RPC transport.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::RpcError;
use super::protocol::{RpcRequest, RpcResponse};
use crate::config::RpcConfig;

/// Transport seam between the sync engine and the daemon.
///
/// The engine only ever talks to the daemon through this trait, which keeps
/// it testable against an in-memory mock.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invokes one daemon method with positional JSON parameters.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;

    /// Uploads a torrent file and returns the server-assigned paths.
    async fn upload_file(&self, content: Vec<u8>, filename: &str)
    -> Result<Vec<String>, RpcError>;
}

/// JSON-RPC client for the Deluge web endpoint.
///
/// Calls POST to `<base>/json`; uploads POST multipart form data to
/// `<base>/upload`. Session cookies are kept so an authenticated login
/// carries over to subsequent calls.
pub struct DelugeRpcClient {
    config: RpcConfig,
    next_id: AtomicU64,
    http: reqwest::Client,
}

impl DelugeRpcClient {
    /// Creates a client against the configured daemon base URL.
    pub fn new(config: RpcConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .cookie_store(true)
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            config,
            next_id: AtomicU64::new(0),
            http,
        }
    }

    fn rpc_url(&self) -> String {
        format!("{}/json", self.config.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/upload", self.config.base_url)
    }

    async fn dispatch(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = RpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: method.to_string(),
            params,
        };
        let deadline = self.config.call_timeout;
        tracing::debug!("RPC call {} (id {})", request.method, request.id);

        let response = self
            .http
            .post(self.rpc_url())
            .timeout(deadline)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("RPC call {} failed: {}", method, e);
                RpcError::from_request_error(e, deadline.as_secs())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("RPC call {} returned HTTP {}", method, status);
            return Err(RpcError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::malformed(format!("invalid JSON body: {e}")))?;

        if let Some(error) = body.error {
            return Err(RpcError::Daemon {
                message: error.message,
                code: error.code,
            });
        }

        Ok(body.result)
    }

    // -----------------------------------------------------------------
    // Session-level wrappers; torrent queries and mutations live on the
    // sync engine.
    // -----------------------------------------------------------------

    /// Authenticates against the web endpoint.
    pub async fn login(&self, password: &str) -> Result<bool, RpcError> {
        let result = self.call("auth.login", vec![Value::from(password)]).await?;
        result
            .as_bool()
            .ok_or_else(|| RpcError::malformed("auth.login did not return a boolean"))
    }

    /// Checks whether the current session cookie is still valid.
    pub async fn check_session(&self) -> Result<bool, RpcError> {
        let result = self.call("auth.check_session", vec![]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Ends the current web session.
    pub async fn logout(&self) -> Result<(), RpcError> {
        self.call("auth.delete_session", vec![]).await?;
        Ok(())
    }

    /// Lists the daemon hosts known to the web endpoint.
    pub async fn hosts(&self) -> Result<Vec<HostEntry>, RpcError> {
        let result = self.call("web.get_hosts", vec![]).await?;
        let rows: Vec<(String, String, u16, String)> = serde_json::from_value(result)
            .map_err(|e| RpcError::malformed(format!("invalid host list: {e}")))?;
        Ok(rows
            .into_iter()
            .map(|(id, host, port, status)| HostEntry {
                id,
                host,
                port,
                status,
            })
            .collect())
    }

    /// Fetches the live status of one daemon host.
    pub async fn host_status(&self, host_id: &str) -> Result<HostStatus, RpcError> {
        let result = self
            .call("web.get_host_status", vec![Value::from(host_id)])
            .await?;
        let row: Vec<Value> = serde_json::from_value(result)
            .map_err(|e| RpcError::malformed(format!("invalid host status: {e}")))?;
        parse_host_status(&row)
    }

    /// Connects the web endpoint to one of its known daemon hosts.
    pub async fn connect(&self, host_id: &str) -> Result<(), RpcError> {
        self.call("web.connect", vec![Value::from(host_id)]).await?;
        Ok(())
    }

    /// Reports whether the web endpoint currently holds a daemon connection.
    pub async fn connected(&self) -> Result<bool, RpcError> {
        let result = self.call("web.connected", vec![]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }
}

/// One daemon host as reported by `web.get_hosts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub id: String,
    pub host: String,
    pub port: u16,
    pub status: String,
}

/// Live status of one daemon host as reported by `web.get_host_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    pub id: String,
    pub status: String,
    pub version: String,
}

/// Parses a host status row.
///
/// Deluge 2.x sends `[id, status, version]`; 1.x pads host and port
/// between id and status. Status and version are always the trailing
/// pair.
fn parse_host_status(row: &[Value]) -> Result<HostStatus, RpcError> {
    if row.len() < 3 {
        return Err(RpcError::malformed("host status row too short"));
    }
    let field = |value: &Value, name: &str| -> Result<String, RpcError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::malformed(format!("host status {name} is not a string")))
    };
    Ok(HostStatus {
        id: field(&row[0], "id")?,
        status: field(&row[row.len() - 2], "status")?,
        version: field(&row[row.len() - 1], "version")?,
    })
}

#[async_trait]
impl RpcTransport for DelugeRpcClient {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        self.dispatch(method, params).await
    }

    /// Uploads a torrent file via the multipart endpoint.
    ///
    /// Callers that need add-by-file to keep working when the upload
    /// endpoint is unavailable fall back to base64-encoding the content
    /// and passing it through `core.add_torrent_file`; see
    /// [`SyncEngine::mutate`](crate::sync::SyncEngine::mutate).
    ///
    /// # Errors
    /// - `RpcError::Timeout` - Upload deadline exceeded
    /// - `RpcError::Http` - Endpoint returned a non-2xx status
    /// - `RpcError::MalformedResponse` - Response body missing the files array
    async fn upload_file(
        &self,
        content: Vec<u8>,
        filename: &str,
    ) -> Result<Vec<String>, RpcError> {
        let deadline = self.config.upload_timeout;
        let part = reqwest::multipart::Part::bytes(content).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.upload_url())
            .timeout(deadline)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Torrent upload failed: {}", e);
                RpcError::from_request_error(e, deadline.as_secs())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::malformed(format!("invalid upload response: {e}")))?;

        let files = body
            .get("files")
            .and_then(Value::as_array)
            .ok_or_else(|| RpcError::malformed("upload response missing files array"))?;

        Ok(files
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod client_tests {
    use super::*;

    fn create_test_client() -> DelugeRpcClient {
        DelugeRpcClient::new(RpcConfig {
            base_url: "http://deluge.example.com:8112".to_string(),
            ..RpcConfig::default()
        })
    }

    #[test]
    fn test_endpoint_urls() {
        let client = create_test_client();
        assert_eq!(client.rpc_url(), "http://deluge.example.com:8112/json");
        assert_eq!(client.upload_url(), "http://deluge.example.com:8112/upload");
    }

    #[test]
    fn test_host_status_row_parsing() {
        use serde_json::json;

        let modern = [json!("abc123"), json!("Connected"), json!("2.1.1")];
        let status = parse_host_status(&modern).unwrap();
        assert_eq!(status.id, "abc123");
        assert_eq!(status.status, "Connected");
        assert_eq!(status.version, "2.1.1");

        let legacy = [
            json!("abc123"),
            json!("localhost"),
            json!(58846),
            json!("Online"),
            json!("1.3.15"),
        ];
        let status = parse_host_status(&legacy).unwrap();
        assert_eq!(status.id, "abc123");
        assert_eq!(status.status, "Online");
        assert_eq!(status.version, "1.3.15");

        assert!(parse_host_status(&[json!("abc123")]).is_err());
    }

    #[test]
    fn test_request_ids_increment() {
        let client = create_test_client();
        assert_eq!(client.next_id.fetch_add(1, Ordering::Relaxed), 0);
        assert_eq!(client.next_id.fetch_add(1, Ordering::Relaxed), 1);
        assert_eq!(client.next_id.fetch_add(1, Ordering::Relaxed), 2);
    }
}
