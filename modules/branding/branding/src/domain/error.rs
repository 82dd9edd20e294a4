//! Domain error types for the branding module.

use thiserror::Error;

/// A color string that is not a 3- or 6-digit hex color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
}

impl ColorError {
    #[must_use]
    pub fn invalid(hex: &str) -> Self {
        Self::InvalidHex(hex.to_owned())
    }
}

/// Failures of the session-scoped store backing persisted form state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Writing would exceed the store's capacity.
    #[error("storage quota exceeded writing {key:?} ({needed} bytes, limit {limit})")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The value could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}
