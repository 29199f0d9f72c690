//! PeakMojo MCP server over stdio
//!
//! Reads newline-delimited JSON-RPC from stdin and writes replies to
//! stdout. Logs go to stderr.

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{error, info};

use mcp_server_peakmojo::config::{Cli, Settings};
use mcp_server_peakmojo::peakmojo;
use mcp_server_peakmojo::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Telemetry comes up before settings are validated so that a bad
    // config is still reported through the log.
    let settings = Settings::load(&cli);
    let log_level = match &settings {
        Ok(settings) => settings.logger.level.clone(),
        Err(_) => cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
    };
    init_telemetry(TelemetryConfig {
        log_level,
        ..TelemetryConfig::default()
    })
    .map_err(|e| anyhow!(e))
    .context("Failed to initialize telemetry")?;

    let settings = settings.context("Failed to load configuration")?;
    info!(
        name = %settings.server.name,
        max_in_flight = settings.server.max_in_flight,
        "Starting PeakMojo MCP server"
    );

    let server = match peakmojo::server_from_settings(&settings).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Server startup failed");
            return Err(e).context("Failed to start server");
        }
    };

    server
        .serve_stdio()
        .await
        .context("Transport failed while serving")?;

    info!("Input closed, shutting down");
    Ok(())
}
