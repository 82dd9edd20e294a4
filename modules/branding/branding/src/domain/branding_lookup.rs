use std::sync::Arc;
use std::time::Duration;

use branding_sdk::{BrandingLookupClient, BrandingSettings, LookupError};
use tracing::instrument;

/// Default upper bound for the branding-by-email lookup.
pub const DEFAULT_EMAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Branding lookups keyed by the authenticated visitor's email.
pub struct BrandingLookupService {
    client: Arc<dyn BrandingLookupClient>,
    defaults: BrandingSettings,
    timeout: Duration,
}

impl BrandingLookupService {
    #[must_use]
    pub fn new(client: Arc<dyn BrandingLookupClient>, defaults: BrandingSettings) -> Self {
        Self {
            client,
            defaults,
            timeout: DEFAULT_EMAIL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn defaults(&self) -> &BrandingSettings {
        &self.defaults
    }

    /// Fetch the tenant branding for `email`, bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// `LookupError::Timeout` when the bound elapses, otherwise whatever the
    /// channel reported.
    #[instrument(skip_all, fields(timeout = ?self.timeout))]
    pub async fn fetch_by_email(&self, email: &str) -> Result<BrandingSettings, LookupError> {
        let record = tokio::time::timeout(self.timeout, self.client.branding_by_email(email))
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))??;
        Ok(record.into_settings(&self.defaults))
    }

    /// Like [`fetch_by_email`](Self::fetch_by_email) but never fails: any
    /// error is logged and mapped to the platform defaults.
    pub async fn fetch_by_email_or_default(&self, email: &str) -> BrandingSettings {
        match self.fetch_by_email(email).await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "branding lookup failed, using platform defaults");
                self.defaults.clone()
            }
        }
    }
}
