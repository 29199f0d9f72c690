//! Server configuration
//!
//! Settings come from three layers, lowest precedence first: built-in
//! defaults, an optional YAML file, then command-line flags (each of which
//! also reads an environment variable). The API key is extracted last and
//! its absence is fatal at startup.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// Default PeakMojo API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.staging.readymojo.com";

/// Command-line interface of the server binary
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "mcp-server-peakmojo", version, about = "PeakMojo MCP server")]
pub struct Cli {
    /// PeakMojo API key
    #[arg(long, env = "PEAKMOJO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// PeakMojo API base URL
    #[arg(long, env = "PEAKMOJO_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to a YAML settings file
    #[arg(long, env = "PEAKMOJO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "PEAKMOJO_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Settings for the PeakMojo MCP server
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Outbound API settings
    #[serde(default)]
    #[validate]
    pub api: ApiSettings,

    /// Retry policy for transient upstream failures
    #[serde(default)]
    #[validate]
    pub retry: RetrySettings,

    /// Protocol server settings
    #[serde(default)]
    #[validate]
    pub server: ServerSettings,

    /// Logger settings
    #[serde(default)]
    pub logger: LoggerSettings,
}

/// Settings for the outbound PeakMojo API
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ApiSettings {
    /// Base URL every endpoint path is joined onto
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// API key sent as a bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Retry settings for transient upstream failures
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetrySettings {
    /// Additional attempts after the first one
    #[serde(default = "default_max_retries")]
    #[validate(range(max = 10))]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after each attempt
    #[serde(default = "default_backoff_factor")]
    #[validate(range(min = 1.0, max = 10.0))]
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

/// Settings for the protocol server
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerSettings {
    /// Name reported in `serverInfo`
    #[serde(default = "default_server_name")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Maximum number of requests processed concurrently
    #[serde(default = "default_max_in_flight")]
    #[validate(range(min = 1, max = 64))]
    pub max_in_flight: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Logger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    2_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_server_name() -> String {
    "peakmojo".to_string()
}

fn default_max_in_flight() -> usize {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The PeakMojo API credential.
///
/// Built once at startup and shared read-only; `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    api_key: String,
}

impl Credential {
    /// Wraps an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// The bearer token to send upstream
    pub fn token(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Resolve settings from an optional file plus CLI/env overrides
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => load_settings(path)?,
            None => Settings::default(),
        };
        settings.apply_cli(cli);
        settings.check()?;
        Ok(settings)
    }

    /// Overlay values given on the command line or in the environment
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(api_key) = &cli.api_key {
            self.api.api_key = Some(api_key.clone());
        }
        if let Some(base_url) = &cli.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(level) = &cli.log_level {
            self.logger.level = level.clone();
        }
    }

    /// Run field validation, mapping failures to a configuration error
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| Error::Config(format!("Invalid settings: {}", e)))?;
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(Error::Config(
                "Invalid settings: retry.initial_delay_ms exceeds retry.max_delay_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Extract the credential; a missing or blank key is fatal
    pub fn credential(&self) -> Result<Credential> {
        match self.api.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Credential::new(key)),
            _ => Err(Error::Config(
                "PeakMojo API key not found; set PEAKMOJO_API_KEY or pass --api-key".to_string(),
            )),
        }
    }
}

/// Load settings from a YAML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}
