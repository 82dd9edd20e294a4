//! Custom-domain branding for visitors who have not signed in yet.
//!
//! Resolution runs once per mount and ends in exactly one terminal phase.
//! It is never retried automatically.

use std::sync::Arc;

use branding_sdk::{DomainBranding, DomainResolution};
use tokio::sync::watch;
use uuid::Uuid;

use super::css::BrandingStyles;
use super::domain_lookup::{DomainLookupService, PageLocation};
use super::ports::CssVariableSink;
use super::state::StateContainer;

/// Shown when a custom domain has no verified tenant mapping.
pub const DOMAIN_NOT_VERIFIED: &str = "Domain not configured or not verified";

/// Shown when the lookup channel itself failed.
pub const DOMAIN_LOOKUP_FAILED: &str = "Failed to load domain configuration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainResolutionPhase {
    Loading,
    NotCustom,
    Unverified,
    Found,
    Error,
}

impl DomainResolutionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != Self::Loading
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::NotCustom => "not_custom",
            Self::Unverified => "unverified",
            Self::Found => "found",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainResolutionState {
    pub is_custom_domain: bool,
    pub domain: Option<String>,
    pub user_id: Option<Uuid>,
    pub branding: Option<DomainBranding>,
    pub loading: bool,
    pub error: Option<String>,
    pub phase: DomainResolutionPhase,
}

impl DomainResolutionState {
    fn loading(domain: String) -> Self {
        Self {
            is_custom_domain: true,
            domain: Some(domain),
            user_id: None,
            branding: None,
            loading: true,
            error: None,
            phase: DomainResolutionPhase::Loading,
        }
    }

    fn not_custom() -> Self {
        Self {
            is_custom_domain: false,
            domain: None,
            user_id: None,
            branding: None,
            loading: false,
            error: None,
            phase: DomainResolutionPhase::NotCustom,
        }
    }

    fn settle(&mut self, resolution: DomainResolution) {
        self.loading = false;
        match resolution {
            DomainResolution::NotCustom => *self = Self::not_custom(),
            DomainResolution::Unverified { domain } => {
                self.domain = Some(domain);
                self.error = Some(DOMAIN_NOT_VERIFIED.to_owned());
                self.phase = DomainResolutionPhase::Unverified;
            }
            DomainResolution::Found { domain, branding } => {
                self.domain = Some(domain);
                self.user_id = Some(branding.user_id);
                self.branding = Some(branding);
                self.phase = DomainResolutionPhase::Found;
            }
        }
    }

    fn fail(&mut self) {
        // Render with platform presentation.
        self.is_custom_domain = false;
        self.loading = false;
        self.error = Some(DOMAIN_LOOKUP_FAILED.to_owned());
        self.phase = DomainResolutionPhase::Error;
    }
}

/// Single-shot resolution of the page's hostname to tenant branding.
pub struct CustomDomainContext {
    state: Arc<StateContainer<DomainResolutionState>>,
}

impl CustomDomainContext {
    /// Classify `location` and, for a custom domain, start the lookup.
    ///
    /// Platform and development hosts settle immediately without a channel
    /// call. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(location: &PageLocation, service: Arc<DomainLookupService>) -> Self {
        if !service.is_custom_domain(location) {
            tracing::debug!(hostname = %location.hostname, "platform host, no custom branding");
            return Self {
                state: Arc::new(StateContainer::new(DomainResolutionState::not_custom())),
            };
        }

        let domain = DomainLookupService::current_domain(location);
        let state = Arc::new(StateContainer::new(DomainResolutionState::loading(
            domain.clone(),
        )));

        let writer = Arc::clone(&state);
        state.spawn(async move {
            let outcome = service.resolve(&domain).await;
            writer.update(|s| {
                match outcome {
                    Ok(resolution) => s.settle(resolution),
                    Err(e) => {
                        tracing::warn!(%domain, error = %e, "custom domain lookup failed");
                        s.fail();
                    }
                }
                true
            });
        });

        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> DomainResolutionState {
        self.state.get_state()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DomainResolutionState> {
        self.state.subscribe()
    }

    /// Project the tenant colors onto `sink` once the domain resolves to a
    /// tenant. They stay applied until the context is disposed.
    pub fn project_styles(&self, sink: Arc<dyn CssVariableSink>) {
        let mut rx = self.subscribe();
        self.state.spawn(async move {
            let resolved = rx
                .wait_for(|s| s.phase.is_terminal())
                .await
                .ok()
                .and_then(|s| s.branding.clone());
            let Some(branding) = resolved else {
                return;
            };
            let _styles = BrandingStyles::apply(sink, &branding.settings);
            std::future::pending::<()>().await;
        });
    }

    /// Wait for the terminal state. `None` if disposed first.
    pub async fn wait_until_resolved(&self) -> Option<DomainResolutionState> {
        self.state.wait_for(|s| s.phase.is_terminal()).await
    }

    pub fn dispose(&self) {
        self.state.dispose();
    }
}

impl Drop for CustomDomainContext {
    fn drop(&mut self) {
        self.dispose();
    }
}
