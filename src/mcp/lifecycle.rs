//! Session lifecycle for the MCP protocol
//!
//! Implements the `initialize` handshake (protocol version negotiation and
//! capability advertisement), the `notifications/initialized` notification
//! and `ping`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::mcp::jsonrpc::JsonRpcHandler;
use crate::mcp::resources::ResourcesCapabilities;
use crate::mcp::tools::ToolsCapabilities;
use crate::mcp::types::JsonRpcError;
use crate::utils::error::McpError;

/// Protocol revisions this server speaks, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// The newest supported protocol revision
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Session state for an MCP connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, before any initialization
    Initial,
    /// `initialize` answered, waiting for `notifications/initialized`
    Initializing,
    /// Ready, initialization complete
    Ready,
}

/// Capabilities advertised in the `initialize` result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Present when the server offers tools
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapabilities>,
    /// Present when the server offers resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourcesCapabilities>,
}

/// Name and version of an MCP peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// Peer name
    pub name: String,
    /// Peer version
    pub version: String,
}

impl Implementation {
    /// This server, under the given name
    pub fn server(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Initialize request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol revision requested by the client
    pub protocol_version: String,
    /// Capabilities offered by the client
    #[serde(default)]
    pub capabilities: Value,
    /// Client information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_info: Option<Implementation>,
}

/// Initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Negotiated protocol revision
    pub protocol_version: String,
    /// Server capabilities
    pub capabilities: ServerCapabilities,
    /// Server information
    pub server_info: Implementation,
}

/// Pick the protocol revision to answer with
pub fn negotiate_protocol_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .find(|v| **v == requested)
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

/// Lifecycle manager for an MCP session
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    /// Server capabilities
    capabilities: ServerCapabilities,
    /// Reported in `serverInfo`
    server_info: Implementation,
    /// Current session state
    state: Arc<RwLock<SessionState>>,
    /// Client that initialized the session
    client_info: Arc<RwLock<Option<Implementation>>>,
}

impl LifecycleManager {
    /// Creates a new lifecycle manager with the specified capabilities
    pub fn new(capabilities: ServerCapabilities, server_info: Implementation) -> Self {
        Self {
            capabilities,
            server_info,
            state: Arc::new(RwLock::new(SessionState::Initial)),
            client_info: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the current session state
    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// The client that sent `initialize`, if any
    pub async fn client_info(&self) -> Option<Implementation> {
        self.client_info.read().await.clone()
    }

    async fn initialize(&self, params: InitializeParams) -> InitializeResult {
        let protocol_version = negotiate_protocol_version(&params.protocol_version);
        if protocol_version != params.protocol_version {
            warn!(
                requested = %params.protocol_version,
                answered = protocol_version,
                "Client requested an unsupported protocol version"
            );
        }

        if let Some(client) = &params.client_info {
            info!(client = %client.name, version = %client.version, "Client initializing");
        }
        *self.client_info.write().await = params.client_info;
        *self.state.write().await = SessionState::Initializing;

        InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: self.capabilities.clone(),
            server_info: self.server_info.clone(),
        }
    }

    /// Registers lifecycle methods with the JSON-RPC handler
    pub async fn register_methods(&self, handler: &JsonRpcHandler) {
        let lifecycle = self.clone();
        handler
            .register_method("initialize", move |call| {
                let lifecycle = lifecycle.clone();
                async move {
                    let params: InitializeParams = call.parse_params()?;
                    let result = lifecycle.initialize(params).await;
                    let json_result = serde_json::to_value(result).map_err(|e| {
                        McpError::Serialization(format!("Failed to serialize result: {}", e))
                    })?;
                    Ok::<_, JsonRpcError>(json_result)
                }
            })
            .await;

        handler
            .register_method("ping", |_| async { Ok::<_, JsonRpcError>(json!({})) })
            .await;

        let lifecycle = self.clone();
        handler
            .register_notification("notifications/initialized", move |_| {
                let lifecycle = lifecycle.clone();
                async move {
                    let mut state = lifecycle.state.write().await;
                    if *state == SessionState::Initial {
                        warn!("Initialized notification received before initialize");
                    }
                    *state = SessionState::Ready;
                    info!("Session ready");
                }
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (LifecycleManager, JsonRpcHandler) {
        let lifecycle = LifecycleManager::new(
            ServerCapabilities {
                tools: Some(ToolsCapabilities::default()),
                resources: None,
            },
            Implementation::server("peakmojo"),
        );
        let handler = JsonRpcHandler::new();
        lifecycle.register_methods(&handler).await;
        (lifecycle, handler)
    }

    async fn send(handler: &JsonRpcHandler, message: Value) -> Option<Value> {
        handler
            .process_json_message(message.to_string().as_bytes())
            .await
            .map(|bytes| serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version("2024-11-05"), "2024-11-05");
        assert_eq!(negotiate_protocol_version("1999-01-01"), LATEST_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_initialize_handshake() {
        let (lifecycle, handler) = setup().await;
        assert_eq!(lifecycle.state().await, SessionState::Initial);

        let reply = send(
            &handler,
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"}
                }
            }),
        )
        .await
        .unwrap();

        let result = &reply["result"];
        assert_eq!(result["protocolVersion"], json!("2025-03-26"));
        assert_eq!(result["serverInfo"]["name"], json!("peakmojo"));
        assert!(result["capabilities"].get("tools").is_some());
        assert!(result["capabilities"].get("resources").is_none());
        assert_eq!(lifecycle.state().await, SessionState::Initializing);
        assert_eq!(lifecycle.client_info().await.unwrap().name, "test-client");

        let reply = send(
            &handler,
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;
        assert!(reply.is_none());
        assert_eq!(lifecycle.state().await, SessionState::Ready);
    }

    #[tokio::test]
    async fn test_initialize_requires_protocol_version() {
        let (_, handler) = setup().await;
        let reply = send(
            &handler,
            json!({"jsonrpc": "2.0", "id": 2, "method": "initialize", "params": {}}),
        )
        .await
        .unwrap();
        assert_eq!(reply["error"]["code"], json!(-32602));
    }

    #[tokio::test]
    async fn test_ping() {
        let (_, handler) = setup().await;
        let reply = send(&handler, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}))
            .await
            .unwrap();
        assert_eq!(reply["result"], json!({}));
        assert_eq!(reply["id"], json!("p"));
    }
}
