use async_trait::async_trait;

use crate::mcp::resources::error::ResourceError;
use crate::mcp::resources::models::{Resource, ResourceReadResponse};

/// Provider for resource access
#[async_trait]
pub trait ResourceProvider: Send + Sync + std::fmt::Debug {
    /// Checks if this provider can handle a given URI
    fn can_handle_uri(&self, uri: &str) -> bool;

    /// Lists resources provided by this provider
    async fn list_resources(&self) -> Result<Vec<Resource>, ResourceError>;

    /// Reads a resource by URI
    async fn read_resource(&self, uri: &str) -> Result<ResourceReadResponse, ResourceError>;
}
