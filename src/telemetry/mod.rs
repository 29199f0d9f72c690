//! Logging and lightweight metrics
//!
//! Logs are written to stderr: stdout carries protocol frames when the
//! server runs over stdio. Metrics are plain `tracing` events on the
//! `metrics` target, so any subscriber can pick them up.

use std::time::Instant;

use tracing_subscriber::EnvFilter;

/// Configuration for the telemetry system
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Name of the service, attached to the startup event
    pub service_name: String,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mcp-server-peakmojo".to_string(),
            log_level: "info".to_string(),
            with_target: true,
        }
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.log_level`. Fails if a global
/// subscriber is already installed.
pub fn init_telemetry(
    config: TelemetryConfig,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(config.with_target)
        .try_init()?;

    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(())
}

/// Add a single metric with tags to the telemetry system
pub fn add_metric(name: &str, value: f64, tags: &[(&str, String)]) {
    let tags_str = tags
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",");

    tracing::debug!(
        target: "metrics",
        metric_name = %name,
        metric_value = %value,
        metric_tags = %tags_str,
        "Recorded metric"
    );
}

/// Guard returned by [`span_duration`]; logs the elapsed time when dropped
#[derive(Debug)]
pub struct DurationGuard {
    name: &'static str,
    start: Instant,
}

impl Drop for DurationGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            target: "metrics",
            duration_ms = duration.as_millis() as f64,
            operation = self.name,
            "Operation completed"
        );
    }
}

/// A span duration tracker for measuring operation durations
pub fn span_duration(name: &'static str) -> DurationGuard {
    DurationGuard {
        name,
        start: Instant::now(),
    }
}
