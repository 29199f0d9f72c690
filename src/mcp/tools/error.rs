use std::fmt;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::api::{AdapterError, AdapterErrorKind};
use crate::mcp::schema::SchemaViolation;
use crate::utils::error::McpError;

/// Failure classes for a single tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// No tool with the requested name is registered
    UnknownTool,
    /// Arguments or result did not match the declared schema
    SchemaViolation,
    /// The upstream rejected the request
    ClientError,
    /// The upstream failed in a way that may succeed later
    TransientError,
    /// The upstream answered with something unusable
    ProtocolMismatch,
    /// Transient failures persisted through every retry
    RetryExhausted,
}

impl ToolErrorKind {
    /// Machine-readable name, used in `structuredContent.error.kind`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::SchemaViolation => "schema_violation",
            Self::ClientError => "client_error",
            Self::TransientError => "transient_error",
            Self::ProtocolMismatch => "protocol_mismatch",
            Self::RetryExhausted => "retry_exhausted",
        }
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-request failure, reported back to the client as an error result
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ToolError {
    /// Failure class
    pub kind: ToolErrorKind,
    /// Description safe to show to the client
    pub message: String,
    /// Upstream HTTP status, if one was received
    pub status: Option<u16>,
    /// JSON pointer to the offending field for schema violations
    pub path: Option<String>,
}

impl ToolError {
    fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            path: None,
        }
    }

    /// The requested tool is not registered
    pub fn unknown_tool(name: &str) -> Self {
        Self::new(ToolErrorKind::UnknownTool, format!("Unknown tool: {}", name))
    }

    /// Arguments could not be interpreted even though they passed the schema
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::SchemaViolation, message)
    }

    /// Input arguments failed validation
    pub fn invalid_input(violation: SchemaViolation) -> Self {
        Self {
            path: Some(violation.path.clone()),
            ..Self::new(
                ToolErrorKind::SchemaViolation,
                format!("Invalid arguments: {}", violation),
            )
        }
    }

    /// The upstream result failed validation
    pub fn invalid_output(violation: SchemaViolation) -> Self {
        Self {
            path: Some(violation.path.clone()),
            ..Self::new(
                ToolErrorKind::SchemaViolation,
                format!("Unexpected response shape: {}", violation),
            )
        }
    }

    /// Transient failures outlasted the retry budget
    pub fn retry_exhausted(attempts: u32, last: AdapterError) -> Self {
        Self {
            status: last.status,
            ..Self::new(
                ToolErrorKind::RetryExhausted,
                format!(
                    "Gave up after {} attempt{}: {}",
                    attempts,
                    if attempts == 1 { "" } else { "s" },
                    last.message
                ),
            )
        }
    }

    /// Structured form placed under `structuredContent.error`
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("kind".to_string(), json!(self.kind.as_str()));
        error.insert("message".to_string(), json!(self.message));
        if let Some(status) = self.status {
            error.insert("status".to_string(), json!(status));
        }
        if let Some(path) = &self.path {
            error.insert("path".to_string(), json!(path));
        }
        Value::Object(error)
    }
}

impl From<AdapterError> for ToolError {
    fn from(error: AdapterError) -> Self {
        let kind = match error.kind {
            AdapterErrorKind::ClientError => ToolErrorKind::ClientError,
            AdapterErrorKind::TransientError => ToolErrorKind::TransientError,
            AdapterErrorKind::ProtocolMismatch => ToolErrorKind::ProtocolMismatch,
        };
        Self {
            kind,
            message: error.message,
            status: error.status,
            path: None,
        }
    }
}

/// Errors raised while building or querying the tool registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A tool with this name is already registered
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// No tool with this name is registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl From<RegistryError> for McpError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::DuplicateTool(_) => McpError::AlreadyExists(error.to_string()),
            RegistryError::UnknownTool(_) => McpError::NotFound(error.to_string()),
        }
    }
}
