//! # MCP Resources
//!
//! Read-only, URI-addressed data a client can list and fetch. Each
//! [`ResourceProvider`] claims a URI scheme; `resources/read` is routed to
//! the first provider that accepts the URI.

mod error;
mod handler;
mod models;
mod provider;

// Re-export the public API
pub use error::ResourceError;
pub use handler::{ResourcesCapabilities, ResourcesHandler};
pub use models::{
    Resource, ResourceListParams, ResourceListResponse, ResourceReadParams,
    ResourceReadResponse, TextContent,
};
pub use provider::ResourceProvider;
