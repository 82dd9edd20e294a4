//! Collaborator traits consumed by the branding module.
//!
//! Both traits are seams to external systems: the privileged lookup channel
//! (which bypasses per-row access control) and the authentication provider.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{AuthError, LookupError};
use crate::models::{AuthEvent, AuthSession, BrandingRecord, DomainLookup};

/// Privileged branding lookup channel.
///
/// Implementations authenticate with a platform credential rather than the
/// visitor's own token, so a session that is not yet fully authorized can
/// still render its tenant's branding.
///
/// ```ignore
/// let record = client.branding_by_email("owner@acme.test").await?;
/// let lookup = client.branding_by_domain("portal.acme.test").await?;
/// ```
#[async_trait]
pub trait BrandingLookupClient: Send + Sync {
    /// Fetch the branding record of the tenant owning `email`.
    ///
    /// # Errors
    ///
    /// Any transport failure, timeout, non-success status or undecodable
    /// body. Callers are expected to fall back to platform defaults.
    async fn branding_by_email(&self, email: &str) -> Result<BrandingRecord, LookupError>;

    /// Resolve a pre-normalized domain to its tenant and branding.
    ///
    /// Unconfigured and unverified domains return `Ok(DomainLookup::NotFound)`.
    ///
    /// # Errors
    ///
    /// Only failures of the channel itself (transport, server error,
    /// malformed record).
    async fn branding_by_domain(&self, domain: &str) -> Result<DomainLookup, LookupError>;
}

/// Authentication collaborator.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Current session, `None` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// `SessionUnavailable` when the session store cannot be read.
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Subscribe to authentication state transitions.
    ///
    /// Dropping the returned receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
