//! MCP server side: JSON-RPC routing, session lifecycle, tools, resources
//! and the stdio transport.
//!
//! A request travels `transport` → `jsonrpc` → a method handler. For
//! `tools/call` that handler hands off to the [`dispatcher`], which resolves
//! the tool in its registry, validates arguments against the tool's schema,
//! invokes the upstream API with retries and validates what comes back.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mcp_server_peakmojo::api::HttpApiClient;
//! use mcp_server_peakmojo::config::Credential;
//! use mcp_server_peakmojo::mcp::dispatcher::Dispatcher;
//! use mcp_server_peakmojo::mcp::lifecycle::Implementation;
//! use mcp_server_peakmojo::mcp::retry::RetryPolicy;
//! use mcp_server_peakmojo::mcp::server::McpServer;
//! use mcp_server_peakmojo::mcp::tools::ToolRegistry;
//! use mcp_server_peakmojo::mcp::transport::TransportConfig;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpApiClient::new("https://api.example.com", std::time::Duration::from_secs(30))?;
//!     let dispatcher = Arc::new(Dispatcher::new(
//!         Arc::new(ToolRegistry::new()),
//!         Arc::new(client),
//!         Arc::new(Credential::new("secret")),
//!         RetryPolicy::default(),
//!     ));
//!     let server = McpServer::new(
//!         Implementation::server("example"),
//!         dispatcher,
//!         Vec::new(),
//!         TransportConfig::default(),
//!     )
//!     .await;
//!     server.serve_stdio().await?;
//!     Ok(())
//! }
//! ```

/// JSON-RPC 2.0 wire types
pub mod types;

/// JSON-RPC method routing
pub mod jsonrpc;

/// Line-delimited stdio transport
pub mod transport;

/// Session lifecycle: initialize, initialized, ping
pub mod lifecycle;

/// Tool registry, models and the `tools/*` methods
pub mod tools;

/// Resource providers and the `resources/*` methods
pub mod resources;

/// JSON Schema compilation and validation
pub mod schema;

/// Retry policy for transient upstream failures
pub mod retry;

/// Tool call state machine
pub mod dispatcher;

/// Server assembly
pub mod server;
