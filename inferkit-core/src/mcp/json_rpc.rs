//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version string required on every message.
pub const JSONRPC_VERSION: &str = "2.0";

/// A request expecting a response with the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Request id; the client uses monotonically increasing integers.
    pub id: i64,
    /// Method name, e.g. `"tools/list"`.
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A notification: no id, no response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Method name, e.g. `"notifications/initialized"`.
    pub method: String,
    /// Method parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// A response to a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The id of the request being answered.
    pub id: i64,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Additional error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Create a request.
    pub fn new(id: i64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

impl JsonRpcNotification {
    /// Create a notification.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Try to interpret an incoming message as a response.
///
/// Servers may also send requests and notifications of their own; those
/// have no `id`-with-`result`/`error` shape and return `None` here.
pub fn parse_response(message: &Value) -> Option<JsonRpcResponse> {
    if message.get("id").is_some()
        && (message.get("result").is_some() || message.get("error").is_some())
    {
        serde_json::from_value(message.clone()).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_with_version() {
        let request = JsonRpcRequest::new(1, "tools/list", None);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], 1);
        assert!(value.get("params").is_none());
    }

    #[test]
    fn responses_are_recognised() {
        let response = parse_response(&json!({
            "jsonrpc": "2.0", "id": 3, "result": {"ok": true}
        }))
        .unwrap();
        assert_eq!(response.id, 3);
        assert!(response.error.is_none());

        // A server-initiated request is not a response.
        assert!(parse_response(&json!({
            "jsonrpc": "2.0", "id": 4, "method": "sampling/createMessage"
        }))
        .is_none());

        // Neither is a notification.
        assert!(parse_response(&json!({
            "jsonrpc": "2.0", "method": "notifications/progress"
        }))
        .is_none());
    }
}
