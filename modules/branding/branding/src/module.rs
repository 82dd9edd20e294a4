use std::sync::Arc;
use std::time::Duration;

use branding_sdk::{AuthClient, BrandingLookupClient, BrandingSettings};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::BrandingConfig;
use crate::domain::branding_context::BrandingContext;
use crate::domain::branding_lookup::BrandingLookupService;
use crate::domain::custom_domain_context::CustomDomainContext;
use crate::domain::domain_lookup::{DomainClassifier, DomainLookupService, PageLocation};
use crate::domain::persisted_state::PersistedState;
use crate::domain::ports::SessionStore;
use crate::domain::theme::ThemePartitioner;
use crate::infra::http_lookup::HttpBrandingLookupClient;
use crate::infra::session_store::MemorySessionStore;

/// The branding subsystem wired from configuration.
///
/// Cheap to clone; every clone shares the same services and session store.
#[derive(Clone)]
pub struct BrandingModule {
    domains: Arc<DomainLookupService>,
    branding: Arc<BrandingLookupService>,
    theme: ThemePartitioner,
    sessions: Arc<dyn SessionStore>,
    debounce: Duration,
    platform_logo: String,
}

impl BrandingModule {
    /// Wire the module against the HTTP lookup channel.
    ///
    /// # Errors
    ///
    /// Invalid lookup endpoints or an HTTP client that cannot be built.
    pub fn from_config(config: &BrandingConfig) -> anyhow::Result<Self> {
        let client = HttpBrandingLookupClient::from_config(&config.lookup)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Wire the module against any lookup channel.
    #[must_use]
    pub fn with_client(config: &BrandingConfig, client: Arc<dyn BrandingLookupClient>) -> Self {
        let defaults = config.defaults.settings();
        let domains = DomainLookupService::new(
            DomainClassifier::from_config(&config.domains),
            Arc::clone(&client),
            defaults.clone(),
        );
        let branding =
            BrandingLookupService::new(client, defaults).with_timeout(config.lookup.email_timeout);

        tracing::info!(
            module = "branding",
            platform_domains = config.domains.platform_domains.len(),
            "branding module initialized"
        );

        Self {
            domains: Arc::new(domains),
            branding: Arc::new(branding),
            theme: ThemePartitioner::from_config(&config.theme),
            sessions: Arc::new(MemorySessionStore::new()),
            debounce: config.persistence.debounce,
            platform_logo: config.defaults.logo_url.clone(),
        }
    }

    /// Replace the session store backing persisted form state.
    #[must_use]
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = store;
        self
    }

    #[must_use]
    pub fn domain_lookup(&self) -> &Arc<DomainLookupService> {
        &self.domains
    }

    #[must_use]
    pub fn branding_lookup(&self) -> &Arc<BrandingLookupService> {
        &self.branding
    }

    #[must_use]
    pub fn defaults(&self) -> &BrandingSettings {
        self.branding.defaults()
    }

    /// Logo to render for `settings`, falling back to the platform logo.
    #[must_use]
    pub fn logo_for<'a>(&'a self, settings: &'a BrandingSettings) -> &'a str {
        settings.logo_or(&self.platform_logo)
    }

    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount_branding(&self, auth: Arc<dyn AuthClient>) -> BrandingContext {
        BrandingContext::mount(auth, Arc::clone(&self.branding))
    }

    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount_custom_domain(&self, location: &PageLocation) -> CustomDomainContext {
        CustomDomainContext::mount(location, Arc::clone(&self.domains))
    }

    #[must_use]
    pub fn persisted_state<T>(&self, key: impl Into<String>, initial: T) -> PersistedState<T>
    where
        T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
    {
        PersistedState::with_debounce(Arc::clone(&self.sessions), key, initial, self.debounce)
    }

    #[must_use]
    pub fn theme_storage_key(&self, path: &str) -> &str {
        self.theme.storage_key(path)
    }
}
