use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::jsonrpc::JsonRpcHandler;
use crate::mcp::tools::models::{Tool, ToolCallRequest};
use crate::mcp::types::JsonRpcError;
use crate::utils::error::McpError;

/// Request parameters for listing tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsParams {
    /// Optional cursor for pagination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Response for listing tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResponse {
    /// List of available tools
    pub tools: Vec<Tool>,

    /// Optional cursor for fetching next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Request parameters for calling a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to call
    pub name: String,

    /// Arguments to pass to the tool
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl CallToolParams {
    fn into_request(self, request_id: Value) -> Result<ToolCallRequest, McpError> {
        let arguments = match self.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => {
                return Err(McpError::InvalidParams(
                    "arguments must be an object".to_string(),
                ))
            }
        };
        Ok(ToolCallRequest::new(request_id, self.name, arguments))
    }
}

/// Handler capabilities for tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapabilities {
    /// Whether the server supports notifying clients when the tool list changes
    #[serde(default)]
    pub list_changed: bool,
}

/// Serves `tools/list` and `tools/call`
#[derive(Clone)]
pub struct ToolsHandler {
    /// Dispatcher that executes calls
    dispatcher: Arc<Dispatcher>,

    /// Capabilities of the tools handler
    capabilities: ToolsCapabilities,
}

impl fmt::Debug for ToolsHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolsHandler")
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl ToolsHandler {
    /// Creates a new tools handler; the tool list is fixed, so no change notifications
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            capabilities: ToolsCapabilities::default(),
        }
    }

    /// Returns the capabilities of this handler
    pub fn capabilities(&self) -> &ToolsCapabilities {
        &self.capabilities
    }

    /// Registers methods with the JSON-RPC handler
    pub async fn register_methods(&self, method_handler: &JsonRpcHandler) {
        let list_dispatcher = Arc::clone(&self.dispatcher);
        method_handler
            .register_method("tools/list", move |call| {
                let dispatcher = Arc::clone(&list_dispatcher);
                async move {
                    let _params: ListToolsParams = call.parse_params()?;
                    let response = ListToolsResponse {
                        tools: dispatcher.registry().tools(),
                        next_cursor: None,
                    };
                    let value = serde_json::to_value(response).map_err(|e| {
                        McpError::Serialization(format!("Serialization error: {}", e))
                    })?;
                    Ok::<_, JsonRpcError>(value)
                }
            })
            .await;

        let call_dispatcher = Arc::clone(&self.dispatcher);
        method_handler
            .register_method("tools/call", move |call| {
                let dispatcher = Arc::clone(&call_dispatcher);
                async move {
                    let params: CallToolParams = call.parse_params()?;
                    let request = params.into_request(call.id)?;
                    let result = dispatcher.dispatch(request).await.into_tool_result();
                    let value = serde_json::to_value(result).map_err(|e| {
                        McpError::Serialization(format!("Serialization error: {}", e))
                    })?;
                    Ok::<_, JsonRpcError>(value)
                }
            })
            .await;
    }
}
