//! Shared helpers.

/// Protocol-level error type and result alias
pub mod error;
