//! Transport layer for the MCP protocol.
//!
//! Frames are newline-delimited JSON-RPC messages. The server reads them
//! from any `AsyncRead` (stdin in production) and writes replies to any
//! `AsyncWrite` (stdout).

/// Line-delimited stdio transport
pub mod stdio;

pub use stdio::{StdioTransport, TransportConfig};
