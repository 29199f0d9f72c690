use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use super::types::{AdapterError, ApiAdapter, ApiRequest};
use crate::config::{ApiSettings, Credential};
use crate::error::{Error, Result};
use crate::telemetry::add_metric;

/// HTTP client for the PeakMojo API
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    /// Base URL every request path is appended to
    base_url: Url,

    /// HTTP client for making requests
    client: Client,
}

impl HttpApiClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Base URL {} cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Create a client from the `api` section of the settings
    pub fn from_settings(settings: &ApiSettings) -> Result<Self> {
        Self::new(
            &settings.base_url,
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join the request's path segments onto the base URL
    fn url_for(&self, request: &ApiRequest) -> std::result::Result<Url, AdapterError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AdapterError::protocol_mismatch(None, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(request.segments.iter());
        Ok(url)
    }
}

#[async_trait]
impl ApiAdapter for HttpApiClient {
    #[instrument(skip(self, request, credential), fields(request = %request))]
    async fn invoke(
        &self,
        request: &ApiRequest,
        credential: &Credential,
    ) -> std::result::Result<Value, AdapterError> {
        let start = Instant::now();
        let url = self.url_for(request)?;
        debug!("Sending request to PeakMojo API: {}", url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .bearer_auth(credential.token());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!("Request to PeakMojo API failed: {}", e);
            transport_error(&e)
        })?;

        let status = response.status();
        add_metric(
            "peakmojo.upstream.latency_ms",
            start.elapsed().as_millis() as f64,
            &[
                ("path", request.path()),
                ("status", status.as_u16().to_string()),
            ],
        );

        let body = response.text().await.map_err(|e| {
            warn!("Reading PeakMojo API response failed: {}", e);
            AdapterError::transient(
                Some(status.as_u16()),
                "failed to read upstream response body",
            )
        })?;

        map_response(status, &body)
    }
}

/// Classify a failed send. Messages are fixed strings; the underlying
/// error is only logged.
fn transport_error(error: &reqwest::Error) -> AdapterError {
    if error.is_builder() {
        AdapterError::protocol_mismatch(None, "could not build upstream request")
    } else if error.is_timeout() {
        AdapterError::transient(None, "upstream request timed out")
    } else if error.is_connect() {
        AdapterError::transient(None, "could not connect to upstream")
    } else {
        AdapterError::transient(None, "upstream request failed")
    }
}

/// Classify an upstream response
fn map_response(status: StatusCode, body: &str) -> std::result::Result<Value, AdapterError> {
    let code = status.as_u16();

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(json!({}));
        }
        return serde_json::from_str(body).map_err(|e| {
            AdapterError::protocol_mismatch(
                Some(code),
                format!("Response body is not valid JSON: {}", e),
            )
        });
    }

    if status.is_client_error() {
        debug!(status = code, "PeakMojo API rejected the request");
        Err(AdapterError::client(code, body))
    } else if status.is_server_error() {
        warn!(status = code, "PeakMojo API server error");
        Err(AdapterError::transient(Some(code), body))
    } else {
        Err(AdapterError::protocol_mismatch(
            Some(code),
            format!("Unexpected status {}", status),
        ))
    }
}
