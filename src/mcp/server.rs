use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::jsonrpc::JsonRpcHandler;
use crate::mcp::lifecycle::{Implementation, LifecycleManager, ServerCapabilities};
use crate::mcp::resources::{ResourceProvider, ResourcesHandler};
use crate::mcp::tools::ToolsHandler;
use crate::mcp::transport::{StdioTransport, TransportConfig};
use crate::utils::error::McpResult;

/// A fully wired MCP server: lifecycle, tools and resources behind one router
#[derive(Debug, Clone)]
pub struct McpServer {
    handler: Arc<JsonRpcHandler>,
    lifecycle: LifecycleManager,
    transport: TransportConfig,
}

impl McpServer {
    /// Register every method on a fresh router
    pub async fn new(
        server_info: Implementation,
        dispatcher: Arc<Dispatcher>,
        resource_providers: Vec<Arc<dyn ResourceProvider>>,
        transport: TransportConfig,
    ) -> Self {
        let handler = JsonRpcHandler::new();

        let tools = ToolsHandler::new(dispatcher);
        tools.register_methods(&handler).await;

        let resources = ResourcesHandler::new(resource_providers);
        resources.register_methods(&handler).await;

        let capabilities = ServerCapabilities {
            tools: Some(tools.capabilities().clone()),
            resources: Some(resources.capabilities()),
        };
        let lifecycle = LifecycleManager::new(capabilities, server_info);
        lifecycle.register_methods(&handler).await;

        Self {
            handler: Arc::new(handler),
            lifecycle,
            transport,
        }
    }

    /// The JSON-RPC router
    pub fn handler(&self) -> Arc<JsonRpcHandler> {
        Arc::clone(&self.handler)
    }

    /// Session lifecycle
    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    /// Serve newline-delimited JSON-RPC until `reader` closes
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        StdioTransport::new(self.handler(), self.transport.clone())
            .serve(reader, writer)
            .await
    }

    /// Serve on stdin/stdout
    pub async fn serve_stdio(&self) -> McpResult<()> {
        info!("Serving MCP over stdio");
        StdioTransport::new(self.handler(), self.transport.clone())
            .serve_stdio()
            .await
    }
}
