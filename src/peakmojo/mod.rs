//! PeakMojo tools and resources, and the server assembled from them

/// `peakmojo://` resource provider
pub mod resources;
/// Tool catalog and endpoint mapping
pub mod tools;

pub use resources::PeakMojoResources;
pub use tools::{register_tools, PeakMojoCall};

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiAdapter, HttpApiClient};
use crate::config::{Credential, Settings};
use crate::error::Result;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::lifecycle::Implementation;
use crate::mcp::retry::RetryPolicy;
use crate::mcp::server::McpServer;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::transport::TransportConfig;

/// Assemble the PeakMojo server over an arbitrary adapter
pub async fn build_server(
    settings: &Settings,
    adapter: Arc<dyn ApiAdapter>,
    credential: Credential,
) -> Result<McpServer> {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry)?;
    info!(tools = registry.len(), "Tool catalog registered");

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(registry),
        adapter,
        Arc::new(credential),
        RetryPolicy::from(&settings.retry),
    ));
    let resources = Arc::new(PeakMojoResources::new(Arc::clone(&dispatcher)));

    Ok(McpServer::new(
        Implementation::server(settings.server.name.clone()),
        dispatcher,
        vec![resources],
        TransportConfig {
            max_in_flight: settings.server.max_in_flight,
        },
    )
    .await)
}

/// Assemble the PeakMojo server talking to the configured API.
///
/// Fails when the API key is missing or the base URL is unusable.
pub async fn server_from_settings(settings: &Settings) -> Result<McpServer> {
    let credential = settings.credential()?;
    let client = HttpApiClient::from_settings(&settings.api)?;
    info!(base_url = %client.base_url(), "PeakMojo API client ready");
    build_server(settings, Arc::new(client), credential).await
}
