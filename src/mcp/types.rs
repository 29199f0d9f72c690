//! # JSON-RPC Types
//!
//! Wire structures for JSON-RPC 2.0 as used by the Model Context Protocol:
//!
//! - `JsonRpcRequest`: A method invocation carrying an `id`
//! - `JsonRpcResponse`: The result of a method call, or an error
//! - `JsonRpcNotification`: One-way messages that require no response
//! - `JsonRpcError`: Standard error format for JSON-RPC
//!
//! ## Example
//!
//! ```rust
//! use mcp_server_peakmojo::mcp::types::{JsonRpcError, JsonRpcResponse};
//! use serde_json::json;
//!
//! let response = JsonRpcResponse::error(JsonRpcError::method_not_found("nope"), json!(7));
//! assert_eq!(response.error.unwrap().code, -32601);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only JSON-RPC version this server speaks
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request object for MCP protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,
    /// Method name to invoke
    pub method: String,
    /// Parameters for the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Unique identifier for the request
    pub id: Value,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    pub fn new(method: &str, params: Option<Value>, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response object for MCP protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,
    /// Result of the method call, must be present if no error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information, must be present if no result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier that this response corresponds to
    pub id: Value,
}

impl JsonRpcResponse {
    /// Create a new successful JSON-RPC response
    pub fn success(result: Value, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create a new error JSON-RPC response
    pub fn error(error: JsonRpcError, id: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// JSON-RPC 2.0 notification object for MCP protocol (has no ID)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,
    /// Method name to invoke
    pub method: String,
    /// Parameters for the method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 error object for MCP protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new JSON-RPC error
    pub fn new(code: i32, message: &str, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    /// Parse error (-32700)
    pub fn parse_error(message: &str) -> Self {
        Self::new(-32700, message, None)
    }

    /// Invalid request error (-32600)
    pub fn invalid_request(message: &str) -> Self {
        Self::new(-32600, message, None)
    }

    /// Method not found error (-32601)
    pub fn method_not_found(message: &str) -> Self {
        Self::new(-32601, message, None)
    }

    /// Invalid params error (-32602)
    pub fn invalid_params(message: &str) -> Self {
        Self::new(-32602, message, None)
    }

    /// Internal error (-32603)
    pub fn internal_error(message: &str) -> Self {
        Self::new(-32603, message, None)
    }

    /// Server error (-32000 to -32099); out-of-range codes are clamped to -32000
    pub fn server_error(code: i32, message: &str, data: Option<Value>) -> Self {
        let code = if (-32099..=-32000).contains(&code) {
            code
        } else {
            -32000
        };
        Self::new(code, message, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_params_deserializes() {
        let request: JsonRpcRequest =
            serde_json::from_value(json!({"jsonrpc": "2.0", "method": "ping", "id": 3})).unwrap();
        assert_eq!(request.method, "ping");
        assert_eq!(request.params, None);
        assert_eq!(request.id, json!(3));
    }

    #[test]
    fn test_success_response_omits_error() {
        let response = JsonRpcResponse::success(json!({}), json!("a"));
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("error").is_none());
        assert_eq!(value["result"], json!({}));
        assert_eq!(value["id"], json!("a"));
    }

    #[test]
    fn test_server_error_code_is_clamped() {
        assert_eq!(JsonRpcError::server_error(-32002, "x", None).code, -32002);
        assert_eq!(JsonRpcError::server_error(-1, "x", None).code, -32000);
    }
}
