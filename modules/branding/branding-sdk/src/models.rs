//! Public models for the branding module.
//!
//! These are transport-agnostic data structures shared between the branding
//! module, its lookup channel implementations, and its consumers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform primary color used when no tenant override exists.
pub const PLATFORM_PRIMARY_COLOR: &str = "#f97316";

/// Platform secondary color used when no tenant override exists.
pub const PLATFORM_SECONDARY_COLOR: &str = "#ea580c";

/// Resolved branding for a tenant.
///
/// Colors are always present; `logo_url` may be absent, in which case the
/// platform logo is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingSettings {
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
}

impl BrandingSettings {
    /// Platform branding: default colors and no tenant logo.
    #[must_use]
    pub fn platform_default() -> Self {
        Self {
            logo_url: None,
            primary_color: PLATFORM_PRIMARY_COLOR.to_owned(),
            secondary_color: PLATFORM_SECONDARY_COLOR.to_owned(),
        }
    }

    /// Tenant logo if configured, otherwise `platform_logo`.
    #[must_use]
    pub fn logo_or<'a>(&'a self, platform_logo: &'a str) -> &'a str {
        self.logo_url.as_deref().unwrap_or(platform_logo)
    }
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// Raw branding record as delivered by the lookup channel.
///
/// Every field may be missing; [`BrandingRecord::into_settings`] fills the
/// gaps from the platform defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingRecord {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
}

impl BrandingRecord {
    /// Complete the record with `defaults` for every absent or blank field.
    #[must_use]
    pub fn into_settings(self, defaults: &BrandingSettings) -> BrandingSettings {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        BrandingSettings {
            logo_url: present(self.logo_url),
            primary_color: present(self.primary_color)
                .unwrap_or_else(|| defaults.primary_color.clone()),
            secondary_color: present(self.secondary_color)
                .unwrap_or_else(|| defaults.secondary_color.clone()),
        }
    }
}

/// A verified domain mapping as delivered by the lookup channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Tenant owning the domain.
    pub user_id: Uuid,
    pub branding: BrandingRecord,
}

/// Outcome of a domain lookup.
///
/// A domain maps to at most one tenant; unconfigured and unverified domains
/// are both reported as `NotFound` and never carry a partial record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainLookup {
    NotFound,
    Found(DomainRecord),
}

impl DomainLookup {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Branding resolved for a custom domain, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainBranding {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub settings: BrandingSettings,
}

/// Tri-state result of resolving the current hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainResolution {
    /// The hostname belongs to the platform (or is a development host).
    NotCustom,
    /// A custom domain that is not configured or not yet verified.
    Unverified { domain: String },
    /// A custom domain resolved to its tenant.
    Found {
        domain: String,
        branding: DomainBranding,
    },
}

/// Snapshot of the authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub email: Option<String>,
}

impl AuthSession {
    #[must_use]
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }
}

/// Authentication state transitions emitted by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    SignedIn,
    TokenRefreshed,
    SignedOut,
    UserUpdated,
}
