//! Error types for server startup
//!
//! These errors abort process start. Everything that can go wrong while
//! serving a single request is contained per request instead (see
//! [`crate::mcp::tools::ToolError`]).

use std::fmt;

use crate::utils::error::McpError;

/// Startup error types
#[derive(Debug)]
pub enum Error {
    /// Missing or invalid configuration, including a missing credential
    Config(String),

    /// The outbound HTTP client could not be constructed
    Http(String),

    /// Failure while assembling the protocol handlers
    Protocol(McpError),
}

/// Result type for startup operations
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Protocol(err) => Some(err),
            Error::Config(_) | Error::Http(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Http(msg) => write!(f, "HTTP client error: {}", msg),
            Error::Protocol(err) => write!(f, "Protocol setup error: {}", err),
        }
    }
}

impl From<McpError> for Error {
    fn from(err: McpError) -> Self {
        Error::Protocol(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_protocol_errors_keep_their_source() {
        let error: Error = McpError::AlreadyExists("tool echo".to_string()).into();
        assert!(error.to_string().starts_with("Protocol setup error"));
        assert!(error.source().is_some());
        assert!(Error::Config("no key".to_string()).source().is_none());
    }
}
