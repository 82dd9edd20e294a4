//! Branding Module
//!
//! Decides whose branding applies to a visitor and projects it into the UI:
//!
//! - [`domain::domain_lookup`] classifies the hostname and resolves custom domains
//! - [`domain::branding_lookup`] fetches branding by authenticated email
//! - [`domain::branding_context`] and [`domain::custom_domain_context`] hold the
//!   resolved state for a mounted subtree and react to auth events
//! - [`domain::css`] turns branding colors into CSS custom properties
//! - [`domain::persisted_state`] and [`domain::theme`] cover session-scoped form
//!   drafts and per-portal theme storage
//!
//! The public contract lives in `branding-sdk` and is re-exported here.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use branding_sdk::{
    AuthClient, AuthEvent, AuthSession, BrandingLookupClient, BrandingSettings, DomainBranding,
    DomainLookup, DomainResolution, LookupError,
};

pub mod config;
pub mod domain;
pub mod infra;
mod module;

pub use config::BrandingConfig;
pub use module::BrandingModule;
