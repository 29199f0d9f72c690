use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::api::ApiRequest;
use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::resources::{
    Resource, ResourceError, ResourceProvider, ResourceReadResponse, TextContent,
};

/// URI scheme served by [`PeakMojoResources`]
pub const SCHEME: &str = "peakmojo://";

const JSON_MIME: &str = "application/json";

struct ResourceSpec {
    path: &'static str,
    name: &'static str,
    description: &'static str,
    endpoint: &'static [&'static str],
}

const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        path: "users",
        name: "PeakMojo Users",
        description: "Access PeakMojo user-related resources",
        endpoint: &["v1", "users"],
    },
    ResourceSpec {
        path: "personas",
        name: "PeakMojo Personas",
        description: "Access PeakMojo persona-related resources",
        endpoint: &["v1", "personas", "peakmojo_personas"],
    },
    ResourceSpec {
        path: "personas/tags",
        name: "PeakMojo Persona Tags",
        description: "Access PeakMojo persona tags",
        endpoint: &["v1", "personas", "tags"],
    },
    ResourceSpec {
        path: "personas/search",
        name: "PeakMojo Persona Search",
        description: "Search PeakMojo personas",
        endpoint: &["v1", "personas", "search"],
    },
    ResourceSpec {
        path: "scenarios",
        name: "PeakMojo Scenarios",
        description: "Access PeakMojo scenario-related resources",
        endpoint: &["v1", "scenarios", "peakmojo_scenarios"],
    },
    ResourceSpec {
        path: "job_scenarios",
        name: "PeakMojo Job Scenarios",
        description: "Access PeakMojo job scenario resources",
        endpoint: &["v1", "job_scenarios", "peakmojo_scenarios"],
    },
    ResourceSpec {
        path: "jobs",
        name: "PeakMojo Jobs",
        description: "Access PeakMojo job resources",
        endpoint: &["v1", "jobs"],
    },
    ResourceSpec {
        path: "applications",
        name: "PeakMojo Applications",
        description: "Access PeakMojo application resources",
        endpoint: &["v1", "applications"],
    },
    ResourceSpec {
        path: "practices",
        name: "PeakMojo Practices",
        description: "Access PeakMojo practice resources",
        endpoint: &["v1", "practices"],
    },
    ResourceSpec {
        path: "skills",
        name: "PeakMojo Skills",
        description: "Access PeakMojo skill resources",
        endpoint: &["v1", "skills"],
    },
    ResourceSpec {
        path: "certificates",
        name: "PeakMojo Certificates",
        description: "Access PeakMojo certificate resources",
        endpoint: &["v1", "certificates"],
    },
];

/// Serves `peakmojo://` resources by fetching their backing endpoints
pub struct PeakMojoResources {
    dispatcher: Arc<Dispatcher>,
}

impl std::fmt::Debug for PeakMojoResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeakMojoResources")
            .field("resources", &RESOURCES.len())
            .finish()
    }
}

impl PeakMojoResources {
    /// Reads go through `dispatcher`, sharing its credential and retry policy
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn spec_for(uri: &str) -> Result<&'static ResourceSpec, ResourceError> {
        let path = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| ResourceError::InvalidUri(uri.to_string()))?
            .trim_end_matches('/');
        RESOURCES
            .iter()
            .find(|spec| spec.path == path)
            .ok_or_else(|| ResourceError::ResourceNotFound(uri.to_string()))
    }

    /// The endpoint behind `uri`
    pub fn request_for(uri: &str) -> Result<ApiRequest, ResourceError> {
        Self::spec_for(uri).map(|spec| ApiRequest::get(spec.endpoint.iter().copied()))
    }
}

#[async_trait]
impl ResourceProvider for PeakMojoResources {
    fn can_handle_uri(&self, uri: &str) -> bool {
        uri.starts_with(SCHEME)
    }

    async fn list_resources(&self) -> Result<Vec<Resource>, ResourceError> {
        Ok(RESOURCES
            .iter()
            .map(|spec| {
                Resource::new(format!("{}{}", SCHEME, spec.path), spec.name)
                    .with_description(spec.description)
                    .with_mime_type(JSON_MIME)
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn read_resource(&self, uri: &str) -> Result<ResourceReadResponse, ResourceError> {
        let request = Self::request_for(uri)?;
        debug!(endpoint = %request, "Reading resource");
        let payload = self.dispatcher.execute(&request).await?;
        let text = serde_json::to_string_pretty(&payload)?;

        Ok(ResourceReadResponse {
            contents: vec![TextContent::new(uri, text).with_mime_type(JSON_MIME)],
        })
    }
}
