#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::missing_crate_level_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::invalid_codeblock_attributes)]
#![deny(rustdoc::invalid_html_tags)]
#![deny(rustdoc::bare_urls)]
#![deny(clippy::missing_panics_doc)]

//! An MCP server exposing the PeakMojo API to MCP clients.
//!
//! Each PeakMojo endpoint is published as a tool with a JSON Schema for its
//! arguments, and the main collections are published as `peakmojo://`
//! resources. Clients speak JSON-RPC 2.0 over stdin/stdout; tool calls are
//! validated, forwarded to the API with bearer authentication and retried
//! on transient failures.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use mcp_server_peakmojo::config::{Cli, Settings};
//! use mcp_server_peakmojo::peakmojo;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cli = Cli::parse();
//!     let settings = Settings::load(&cli)?;
//!
//!     let server = peakmojo::server_from_settings(&settings).await?;
//!     server.serve_stdio().await?;
//!
//!     Ok(())
//! }
//! ```

/// Outbound PeakMojo HTTP API access
pub mod api;

/// Configuration management
pub mod config;

/// Top-level error type
pub mod error;

/// MCP protocol implementation: routing, lifecycle, tools, resources, transport
pub mod mcp;

/// The PeakMojo tool catalog and resources
pub mod peakmojo;

/// Logging and metrics
pub mod telemetry;

/// Utility modules for error handling
pub mod utils;

// Re-export error types
pub use error::Error;
pub use utils::error::{McpError, McpResult};

/// Re-export telemetry types and functions for easier access
pub use telemetry::{add_metric, init_telemetry, span_duration, TelemetryConfig};

pub use mcp::server::McpServer;
