//! Error types for the branding module.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the privileged lookup channel.
///
/// An unconfigured or unverified domain is not an error: it is reported as
/// [`DomainLookup::NotFound`](crate::DomainLookup::NotFound).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The request never produced a response (connect, DNS, reset, ...).
    #[error("lookup transport failed: {0}")]
    Transport(String),

    /// The lookup did not complete within its upper bound.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The channel answered with a non-success status.
    #[error("lookup returned HTTP {0}")]
    Status(u16),

    /// The response could not be decoded into a complete record.
    #[error("malformed lookup response: {0}")]
    Malformed(String),
}

/// Errors returned by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The current session could not be read.
    #[error("session unavailable: {0}")]
    SessionUnavailable(String),
}
