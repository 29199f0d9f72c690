//! # MCP Tools
//!
//! Tools are named operations a client can invoke with JSON arguments. Each
//! one declares a schema for its arguments and for its result, and knows how
//! to turn validated arguments into an outbound [`ApiRequest`].
//!
//! ## Usage
//!
//! ```rust
//! use mcp_server_peakmojo::api::ApiRequest;
//! use mcp_server_peakmojo::mcp::tools::{ToolDescriptor, ToolError, ToolRegistry};
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//!
//! let mut registry = ToolRegistry::new();
//! let tool = ToolDescriptor::new(
//!     "get_user",
//!     "Fetch a user",
//!     json!({
//!         "type": "object",
//!         "properties": {"user_id": {"type": "string"}},
//!         "required": ["user_id"]
//!     }),
//!     json!({"type": "object"}),
//!     Arc::new(|args: &Value| -> Result<ApiRequest, ToolError> {
//!         let id = args["user_id"].as_str().unwrap_or_default();
//!         Ok(ApiRequest::get(["v1", "users", id]))
//!     }),
//! )
//! .unwrap();
//!
//! registry.register(tool).unwrap();
//! assert!(registry.resolve("get_user").is_ok());
//! ```
//!
//! [`ApiRequest`]: crate::api::ApiRequest

mod error;
mod handler;
mod models;
mod registry;

// Re-export the public API
pub use error::{RegistryError, ToolError, ToolErrorKind};
pub use handler::{
    CallToolParams, ListToolsParams, ListToolsResponse, ToolsCapabilities, ToolsHandler,
};
pub use models::{
    CallStatus, Tool, ToolCallRequest, ToolCallResult, ToolDescriptor, ToolOperation,
    ToolResult, ToolResultContent,
};
pub use registry::ToolRegistry;
