//! Outbound access to the PeakMojo HTTP API
//!
//! [`ApiAdapter`] is the seam between the protocol side and the network:
//! the dispatcher only ever sees an [`ApiRequest`] going in and either a
//! JSON payload or an [`AdapterError`] coming out.

/// reqwest-backed adapter
pub mod client;
/// Requests, adapter errors and the adapter trait
pub mod types;

pub use client::HttpApiClient;
pub use types::{AdapterError, AdapterErrorKind, ApiAdapter, ApiRequest, MAX_ERROR_BODY_BYTES};
