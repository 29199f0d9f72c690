//! JSON-RPC 2.0 routing for the MCP server.
//!
//! This module maps method names to asynchronous handlers and turns raw
//! frames into responses. It handles:
//!
//! - Method and notification registration
//! - Single messages and batches
//! - Conversion of handler failures into JSON-RPC error objects
//!
//! The handler is shared between concurrent request tasks; registrations are
//! expected to happen before serving starts.
//!
//! # Example
//!
//! ```rust
//! use mcp_server_peakmojo::mcp::jsonrpc::JsonRpcHandler;
//! use mcp_server_peakmojo::mcp::types::JsonRpcError;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let handler = JsonRpcHandler::new();
//! handler
//!     .register_method("echo", |call| async move {
//!         Ok::<_, JsonRpcError>(call.params.unwrap_or(json!(null)))
//!     })
//!     .await;
//!
//! let reply = handler
//!     .process_json_message(br#"{"jsonrpc":"2.0","id":1,"method":"echo","params":[1]}"#)
//!     .await
//!     .unwrap();
//! let reply: serde_json::Value = serde_json::from_slice(&reply).unwrap();
//! assert_eq!(reply["result"], json!([1]));
//! # });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};

use crate::mcp::types::{
    JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION,
};
use crate::telemetry;
use crate::utils::error::McpError;

/// Outcome of a method handler
pub type MethodResult = Result<Value, JsonRpcError>;

type MethodHandler = Arc<dyn Fn(MethodCall) -> BoxFuture<'static, MethodResult> + Send + Sync>;
type NotificationHandler = Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A request as seen by a method handler
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Id of the request being answered
    pub id: Value,
    /// Raw params
    pub params: Option<Value>,
}

impl MethodCall {
    /// Decode params into `T`; absent or `null` params decode from `{}`
    pub fn parse_params<T: DeserializeOwned>(&self) -> Result<T, McpError> {
        let params = match &self.params {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(params) => params.clone(),
        };
        serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
    }
}

/// JSON-RPC router for MCP methods
#[derive(Default)]
pub struct JsonRpcHandler {
    /// Registered method handlers mapped by method name
    methods: RwLock<HashMap<String, MethodHandler>>,
    /// Notification handlers mapped by notification name
    notification_handlers: RwLock<HashMap<String, NotificationHandler>>,
}

impl std::fmt::Debug for JsonRpcHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcHandler")
            .field(
                "methods_count",
                &self.methods.try_read().map(|m| m.len()).unwrap_or(0),
            )
            .field(
                "notification_handlers_count",
                &self
                    .notification_handlers
                    .try_read()
                    .map(|h| h.len())
                    .unwrap_or(0),
            )
            .finish()
    }
}

impl JsonRpcHandler {
    /// Creates a new JSON-RPC handler with empty registrations
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method handler; a later registration replaces an earlier one
    #[instrument(skip(self, handler), fields(method = %name))]
    pub async fn register_method<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(MethodCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = MethodResult> + Send + 'static,
    {
        let handler: MethodHandler = Arc::new(move |call| handler(call).boxed());
        self.methods.write().await.insert(name.to_string(), handler);
        debug!("Registered method handler for '{}'", name);
    }

    /// Registers a notification handler
    #[instrument(skip(self, handler), fields(method = %name))]
    pub async fn register_notification<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: NotificationHandler = Arc::new(move |params| handler(params).boxed());
        self.notification_handlers
            .write()
            .await
            .insert(name.to_string(), handler);
        debug!("Registered notification handler for '{}'", name);
    }

    /// Handles a JSON-RPC request and produces exactly one response
    #[instrument(skip(self, request), fields(method = %request.method, id = %request.id))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let _guard = telemetry::span_duration("handle_jsonrpc_request");

        if request.jsonrpc != JSONRPC_VERSION {
            warn!("Invalid JSON-RPC version: {}", request.jsonrpc);
            return JsonRpcResponse::error(
                JsonRpcError::invalid_request("Invalid JSON-RPC version"),
                request.id,
            );
        }

        let handler = self.methods.read().await.get(&request.method).cloned();
        let Some(handler) = handler else {
            warn!("Method not found: {}", request.method);
            return JsonRpcResponse::error(
                JsonRpcError::method_not_found(&format!(
                    "Method '{}' not found",
                    request.method
                )),
                request.id,
            );
        };

        let call = MethodCall {
            id: request.id.clone(),
            params: request.params,
        };
        match handler(call).await {
            Ok(result) => {
                debug!("Method call successful: {}", request.method);
                JsonRpcResponse::success(result, request.id)
            }
            Err(error) => {
                warn!(code = error.code, "Method call failed: {}: {}", request.method, error.message);
                JsonRpcResponse::error(error, request.id)
            }
        }
    }

    /// Handles a JSON-RPC notification; unknown notifications are ignored
    #[instrument(skip(self, notification), fields(method = %notification.method))]
    pub async fn handle_notification(&self, notification: JsonRpcNotification) {
        if notification.jsonrpc != JSONRPC_VERSION {
            warn!(
                "Invalid JSON-RPC version in notification: {}",
                notification.jsonrpc
            );
            return;
        }

        let handler = self
            .notification_handlers
            .read()
            .await
            .get(&notification.method)
            .cloned();
        match handler {
            Some(handler) => handler(notification.params).await,
            None => debug!("No handler for notification method: {}", notification.method),
        }
    }

    /// Processes one raw frame and returns the serialized reply, if any.
    ///
    /// Notifications, batches made only of notifications, and responses sent
    /// by the peer produce no reply.
    pub async fn process_json_message(&self, json_data: &[u8]) -> Option<Vec<u8>> {
        let reply = match serde_json::from_slice::<Value>(json_data) {
            Err(e) => {
                warn!("Invalid JSON received: {}", e);
                Some(response_value(JsonRpcResponse::error(
                    JsonRpcError::parse_error(&format!("Parse error: {}", e)),
                    Value::Null,
                )))
            }
            Ok(Value::Array(batch)) => self.handle_batch(batch).await,
            Ok(message) => self
                .handle_value(message)
                .await
                .map(response_value),
        }?;

        match serde_json::to_vec(&reply) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!("Failed to serialize reply: {}", e);
                None
            }
        }
    }

    async fn handle_batch(&self, batch: Vec<Value>) -> Option<Value> {
        if batch.is_empty() {
            return Some(response_value(JsonRpcResponse::error(
                JsonRpcError::invalid_request("Empty batch"),
                Value::Null,
            )));
        }

        debug!(size = batch.len(), "Handling batch");
        let replies: Vec<Value> = join_all(batch.into_iter().map(|m| self.handle_value(m)))
            .await
            .into_iter()
            .flatten()
            .map(response_value)
            .collect();

        if replies.is_empty() {
            None
        } else {
            Some(Value::Array(replies))
        }
    }

    async fn handle_value(&self, message: Value) -> Option<JsonRpcResponse> {
        let Value::Object(object) = message else {
            return Some(invalid_request("Message must be a JSON object", Value::Null));
        };

        let id = match object.get("id") {
            None => None,
            Some(id @ (Value::String(_) | Value::Number(_) | Value::Null)) => Some(id.clone()),
            Some(_) => return Some(invalid_request("Invalid id", Value::Null)),
        };

        if !object.contains_key("method") {
            if object.contains_key("result") || object.contains_key("error") {
                debug!(id = ?id, "Ignoring response from peer");
                return None;
            }
            return Some(invalid_request(
                "Missing method",
                id.unwrap_or(Value::Null),
            ));
        }

        match id {
            Some(id) => match serde_json::from_value::<JsonRpcRequest>(Value::Object(object)) {
                Ok(request) => Some(self.handle_request(request).await),
                Err(e) => Some(invalid_request(&format!("Invalid request: {}", e), id)),
            },
            None => {
                match serde_json::from_value::<JsonRpcNotification>(Value::Object(object)) {
                    Ok(notification) => self.handle_notification(notification).await,
                    Err(e) => warn!("Invalid notification: {}", e),
                }
                None
            }
        }
    }
}

fn invalid_request(message: &str, id: Value) -> JsonRpcResponse {
    warn!("{}", message);
    JsonRpcResponse::error(JsonRpcError::invalid_request(message), id)
}

fn response_value(response: JsonRpcResponse) -> Value {
    serde_json::to_value(&response).unwrap_or_else(|e| {
        error!("Failed to encode response: {}", e);
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn handler() -> JsonRpcHandler {
        let handler = JsonRpcHandler::new();
        handler
            .register_method("test.method", |_| async { Ok(json!({"result": "success"})) })
            .await;
        handler
            .register_method("test.params", |call| async move {
                #[derive(serde::Deserialize)]
                struct Params {
                    name: String,
                }
                let params: Params = call.parse_params()?;
                Ok::<_, JsonRpcError>(json!(params.name))
            })
            .await;
        handler
    }

    async fn roundtrip(handler: &JsonRpcHandler, message: &str) -> Option<Value> {
        handler
            .process_json_message(message.as_bytes())
            .await
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_register_and_call_method() {
        let handler = handler().await;
        let request = JsonRpcRequest::new("test.method", None, json!("1"));
        let response = handler.handle_request(request).await;
        assert_eq!(response.id, json!("1"));
        assert_eq!(response.result, Some(json!({"result": "success"})));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let handler = handler().await;
        let request = JsonRpcRequest::new("nonexistent.method", None, json!(1));
        let response = handler.handle_request(request).await;
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let handler = handler().await;
        let reply = roundtrip(
            &handler,
            r#"{"jsonrpc":"2.0","id":2,"method":"test.params","params":{"name":3}}"#,
        )
        .await
        .unwrap();
        assert_eq!(reply["error"]["code"], json!(-32602));
        assert_eq!(reply["id"], json!(2));
    }

    #[tokio::test]
    async fn test_parse_error_has_null_id() {
        let handler = handler().await;
        let reply = roundtrip(&handler, "{not json").await.unwrap();
        assert_eq!(reply["error"]["code"], json!(-32700));
        assert_eq!(reply["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_non_object_is_invalid_request() {
        let handler = handler().await;
        let reply = roundtrip(&handler, "42").await.unwrap();
        assert_eq!(reply["error"]["code"], json!(-32600));
    }

    #[tokio::test]
    async fn test_notification_gets_no_reply() {
        let handler = handler().await;
        let seen = Arc::new(RwLock::new(false));
        let flag = Arc::clone(&seen);
        handler
            .register_notification("notifications/initialized", move |_| {
                let flag = Arc::clone(&flag);
                async move {
                    *flag.write().await = true;
                }
            })
            .await;

        let reply = roundtrip(
            &handler,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert!(reply.is_none());
        assert!(*seen.read().await);

        let reply = roundtrip(&handler, r#"{"jsonrpc":"2.0","method":"unknown/notice"}"#).await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_batch() {
        let handler = handler().await;
        let reply = roundtrip(
            &handler,
            r#"[
                {"jsonrpc":"2.0","id":1,"method":"test.method"},
                {"jsonrpc":"2.0","method":"notifications/initialized"},
                {"jsonrpc":"2.0","id":2,"method":"missing"}
            ]"#,
        )
        .await
        .unwrap();
        let replies = reply.as_array().unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], json!(1));
        assert_eq!(replies[1]["error"]["code"], json!(-32601));

        let reply = roundtrip(&handler, "[]").await.unwrap();
        assert_eq!(reply["error"]["code"], json!(-32600));

        let reply =
            roundtrip(&handler, r#"[{"jsonrpc":"2.0","method":"notifications/initialized"}]"#)
                .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_peer_responses_are_ignored() {
        let handler = handler().await;
        let reply = roundtrip(&handler, r#"{"jsonrpc":"2.0","id":9,"result":{}}"#).await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_wrong_version_is_rejected() {
        let handler = handler().await;
        let reply = roundtrip(&handler, r#"{"jsonrpc":"1.0","id":5,"method":"test.method"}"#)
            .await
            .unwrap();
        assert_eq!(reply["error"]["code"], json!(-32600));
        assert_eq!(reply["id"], json!(5));
    }
}
