use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::mcp::jsonrpc::JsonRpcHandler;
use crate::mcp::resources::error::ResourceError;
use crate::mcp::resources::models::*;
use crate::mcp::resources::provider::ResourceProvider;
use crate::mcp::types::JsonRpcError;

/// Represents the capabilities of the resources system
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapabilities {
    /// Whether subscriptions to individual resources are supported
    pub subscribe: bool,
    /// Whether notifications of list changes are supported
    pub list_changed: bool,
}

/// Handles resources-related JSON-RPC methods
#[derive(Debug, Clone)]
pub struct ResourcesHandler {
    /// Collection of resource providers
    providers: Vec<Arc<dyn ResourceProvider>>,
    /// Capabilities
    capabilities: ResourcesCapabilities,
}

impl ResourcesHandler {
    /// Creates a new resources handler; subscriptions are not supported
    pub fn new(providers: Vec<Arc<dyn ResourceProvider>>) -> Self {
        Self {
            providers,
            capabilities: ResourcesCapabilities::default(),
        }
    }

    /// Returns the resources capabilities
    pub fn capabilities(&self) -> ResourcesCapabilities {
        self.capabilities
    }

    /// Lists all available resources
    pub async fn list_resources(&self) -> Result<ResourceListResponse, ResourceError> {
        let mut resources = Vec::new();
        for provider in &self.providers {
            resources.extend(provider.list_resources().await?);
        }

        Ok(ResourceListResponse {
            resources,
            next_cursor: None,
        })
    }

    /// Reads a resource by URI
    #[instrument(skip(self))]
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceReadResponse, ResourceError> {
        match self.providers.iter().find(|p| p.can_handle_uri(uri)) {
            Some(provider) => provider.read_resource(uri).await,
            None => {
                debug!("No provider for resource URI");
                Err(ResourceError::InvalidUri(uri.to_string()))
            }
        }
    }

    /// Registers `resources/list` and `resources/read`
    pub async fn register_methods(&self, method_handler: &JsonRpcHandler) {
        let handler = self.clone();
        method_handler
            .register_method("resources/list", move |call| {
                let handler = handler.clone();
                async move {
                    let _params: ResourceListParams = call.parse_params()?;
                    let response = handler.list_resources().await?;
                    Ok::<_, JsonRpcError>(serde_json::to_value(response).map_err(ResourceError::from)?)
                }
            })
            .await;

        let handler = self.clone();
        method_handler
            .register_method("resources/read", move |call| {
                let handler = handler.clone();
                async move {
                    let params: ResourceReadParams = call.parse_params()?;
                    let response = handler.read_resource(&params.uri).await?;
                    Ok::<_, JsonRpcError>(serde_json::to_value(response).map_err(ResourceError::from)?)
                }
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    #[derive(Debug)]
    struct StaticProvider;

    #[async_trait]
    impl ResourceProvider for StaticProvider {
        fn can_handle_uri(&self, uri: &str) -> bool {
            uri.starts_with("static://")
        }

        async fn list_resources(&self) -> Result<Vec<Resource>, ResourceError> {
            Ok(vec![Resource::new("static://greeting", "greeting")
                .with_mime_type("text/plain")])
        }

        async fn read_resource(&self, uri: &str) -> Result<ResourceReadResponse, ResourceError> {
            if uri != "static://greeting" {
                return Err(ResourceError::ResourceNotFound(uri.to_string()));
            }
            Ok(ResourceReadResponse {
                contents: vec![TextContent::new(uri, "hello").with_mime_type("text/plain")],
            })
        }
    }

    async fn setup() -> JsonRpcHandler {
        let handler = JsonRpcHandler::new();
        ResourcesHandler::new(vec![Arc::new(StaticProvider)])
            .register_methods(&handler)
            .await;
        handler
    }

    async fn send(handler: &JsonRpcHandler, message: Value) -> Value {
        let bytes = handler
            .process_json_message(message.to_string().as_bytes())
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_and_read() {
        let handler = setup().await;

        let reply = send(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"})).await;
        assert_eq!(reply["result"]["resources"][0]["uri"], json!("static://greeting"));
        assert_eq!(reply["result"]["resources"][0]["mimeType"], json!("text/plain"));

        let reply = send(
            &handler,
            json!({"jsonrpc": "2.0", "id": 2, "method": "resources/read", "params": {"uri": "static://greeting"}}),
        )
        .await;
        assert_eq!(reply["result"]["contents"][0]["text"], json!("hello"));
    }

    #[tokio::test]
    async fn test_read_errors() {
        let handler = setup().await;

        let reply = send(
            &handler,
            json!({"jsonrpc": "2.0", "id": 3, "method": "resources/read", "params": {"uri": "static://missing"}}),
        )
        .await;
        assert_eq!(reply["error"]["code"], json!(-32002));

        let reply = send(
            &handler,
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/read", "params": {"uri": "file:///etc/passwd"}}),
        )
        .await;
        assert_eq!(reply["error"]["code"], json!(-32602));

        let reply = send(&handler, json!({"jsonrpc": "2.0", "id": 5, "method": "resources/read"})).await;
        assert_eq!(reply["error"]["code"], json!(-32602));
    }
}
