use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

use crate::config::Credential;

/// Longest upstream error body surfaced to callers, in bytes
pub const MAX_ERROR_BODY_BYTES: usize = 2048;

/// An outbound call against the external API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path segments, joined onto the base URL and percent-encoded one by one
    pub segments: Vec<String>,
    /// JSON body, if any
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request with the given method and path segments
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    /// Creates a GET request
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// Creates a POST request without a body
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// Attaches a JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The unencoded path, for logging
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

/// How an outbound call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// The upstream rejected the request (4xx); retrying is futile
    ClientError,
    /// Server fault (5xx) or network failure; may succeed on retry
    TransientError,
    /// The response could not be understood
    ProtocolMismatch,
}

impl AdapterErrorKind {
    /// Machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientError => "client_error",
            Self::TransientError => "transient_error",
            Self::ProtocolMismatch => "protocol_mismatch",
        }
    }
}

impl fmt::Display for AdapterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single outbound call
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
pub struct AdapterError {
    /// Failure class, drives the retry decision
    pub kind: AdapterErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    /// Upstream body or transport error description
    pub message: String,
}

impl AdapterError {
    /// A 4xx response
    pub fn client(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::ClientError,
            status: Some(status),
            message: truncate_body(body.into()),
        }
    }

    /// A 5xx response or a network failure
    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::TransientError,
            status,
            message: truncate_body(message.into()),
        }
    }

    /// A response that could not be interpreted
    pub fn protocol_mismatch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::ProtocolMismatch,
            status,
            message: truncate_body(message.into()),
        }
    }

    /// Whether the dispatcher may retry this failure
    pub fn is_transient(&self) -> bool {
        self.kind == AdapterErrorKind::TransientError
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut cut = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Performs outbound calls against the external API.
///
/// Implementations make exactly one network call per invocation; retries are
/// the caller's concern.
#[async_trait]
pub trait ApiAdapter: Send + Sync {
    /// Sends `request` authenticated with `credential` and returns the parsed body
    async fn invoke(&self, request: &ApiRequest, credential: &Credential)
        -> Result<Value, AdapterError>;
}
