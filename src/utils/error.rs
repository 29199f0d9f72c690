use thiserror::Error;

use crate::mcp::types::JsonRpcError;

/// A specialized Result type for MCP operations.
pub type McpResult<T> = Result<T, McpError>;

/// Represents errors that can occur during MCP protocol operations.
#[derive(Debug, Error)]
pub enum McpError {
    /// Request parameters could not be decoded
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// A requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same key is already registered
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// A schema could not be compiled
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// IO error during read/write operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize an outgoing value
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<McpError> for JsonRpcError {
    fn from(error: McpError) -> Self {
        match error {
            McpError::InvalidParams(_) => JsonRpcError::invalid_params(&error.to_string()),
            _ => JsonRpcError::internal_error(&error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_params_keep_their_code() {
        let error: JsonRpcError = McpError::InvalidParams("missing uri".to_string()).into();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("missing uri"));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let errors = vec![
            McpError::NotFound("x".to_string()),
            McpError::AlreadyExists("x".to_string()),
            McpError::InvalidSchema("x".to_string()),
            McpError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed")),
            McpError::Serialization("x".to_string()),
            McpError::Internal("x".to_string()),
        ];
        for error in errors {
            let mapped: JsonRpcError = error.into();
            assert_eq!(mapped.code, -32603);
        }
    }
}
