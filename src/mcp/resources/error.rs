use crate::mcp::tools::ToolError;
use crate::mcp::types::JsonRpcError;
use thiserror::Error;

/// Errors that can occur in the resources system
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid URI format
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// The upstream API failed while fetching the resource
    #[error("Upstream error: {0}")]
    Upstream(ToolError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ResourceError> for JsonRpcError {
    fn from(error: ResourceError) -> Self {
        match &error {
            ResourceError::ResourceNotFound(_) => {
                JsonRpcError::new(-32002, "Resource not found", Some(error.to_string().into()))
            }
            ResourceError::InvalidUri(_) => {
                JsonRpcError::new(-32602, "Invalid URI", Some(error.to_string().into()))
            }
            ResourceError::Upstream(upstream) => {
                JsonRpcError::server_error(-32001, &error.to_string(), Some(upstream.to_json()))
            }
            ResourceError::SerializationError(_) => {
                JsonRpcError::new(-32603, "Internal error", Some(error.to_string().into()))
            }
        }
    }
}

impl From<ToolError> for ResourceError {
    fn from(error: ToolError) -> Self {
        ResourceError::Upstream(error)
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(error: serde_json::Error) -> Self {
        ResourceError::SerializationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AdapterError;

    #[test]
    fn test_json_rpc_codes() {
        let error: JsonRpcError = ResourceError::ResourceNotFound("peakmojo://x".into()).into();
        assert_eq!(error.code, -32002);

        let error: JsonRpcError = ResourceError::InvalidUri("http://x".into()).into();
        assert_eq!(error.code, -32602);

        let upstream = ToolError::from(AdapterError::client(403, "forbidden"));
        let error: JsonRpcError = ResourceError::from(upstream).into();
        assert_eq!(error.code, -32001);
        assert_eq!(error.data.unwrap()["status"], serde_json::json!(403));
    }
}
