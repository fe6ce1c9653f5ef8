//! Wire types for the daemon's JSON-RPC dialect.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single outbound RPC call.
///
/// Ids auto-increment per client; wrap-around is not a concern at
/// realistic call volumes.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

/// A daemon response body.
///
/// Exactly one of `result` and `error` is meaningful: a non-null `error`
/// field marks the call as failed regardless of `result`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

/// The daemon-side error payload carried in a response.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: i64,
}

#[cfg(test)]
mod protocol_tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_serializes_positional_params() {
        let request = RpcRequest {
            id: 7,
            method: "core.pause_torrents".to_string(),
            params: vec![json!(["abc123"])],
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({"id": 7, "method": "core.pause_torrents", "params": [["abc123"]]})
        );
    }

    #[test]
    fn test_response_with_result() {
        let body = json!({"id": 1, "result": true, "error": null});
        let response: RpcResponse = serde_json::from_value(body).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result, json!(true));
    }

    #[test]
    fn test_response_with_error() {
        let body = json!({"id": 1, "result": null, "error": {"message": "not authenticated", "code": 1}});
        let response: RpcResponse = serde_json::from_value(body).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.message, "not authenticated");
        assert_eq!(error.code, 1);
    }

    #[test]
    fn test_response_tolerates_missing_error_field() {
        let body = json!({"id": 3, "result": "ok"});
        let response: RpcResponse = serde_json::from_value(body).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.result, json!("ok"));
    }
}
