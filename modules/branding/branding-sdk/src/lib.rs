//! Branding SDK
//!
//! This crate provides the public contract of the `branding` module:
//!
//! - [`BrandingLookupClient`] - Privileged lookup channel (by email, by domain)
//! - [`AuthClient`] - Authentication collaborator (session + event stream)
//! - [`BrandingSettings`], [`DomainLookup`], [`DomainResolution`] - Domain models
//! - [`LookupError`], [`AuthError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use branding_sdk::{BrandingLookupClient, DomainLookup};
//!
//! let record = client.branding_by_email("owner@acme.test").await?;
//! let settings = record.into_settings(&BrandingSettings::platform_default());
//!
//! match client.branding_by_domain("portal.acme.test").await? {
//!     DomainLookup::Found(found) => println!("tenant {}", found.user_id),
//!     DomainLookup::NotFound => println!("domain not configured"),
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod error;
pub mod models;

pub use api::{AuthClient, BrandingLookupClient};
pub use error::{AuthError, LookupError};
pub use models::{
    AuthEvent, AuthSession, BrandingRecord, BrandingSettings, DomainBranding, DomainLookup,
    DomainRecord, DomainResolution, PLATFORM_PRIMARY_COLOR, PLATFORM_SECONDARY_COLOR,
};
