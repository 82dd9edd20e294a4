//! Hostname classification and custom-domain resolution.

use std::sync::Arc;

use branding_sdk::{
    BrandingLookupClient, BrandingSettings, DomainBranding, DomainLookup, DomainResolution,
    LookupError,
};
use tracing::instrument;

use crate::config::DomainsConfig;

/// Trim, lowercase and strip trailing slashes and DNS root dots.
#[must_use]
pub fn normalize_domain(domain: &str) -> String {
    domain
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c == '.' || c.is_whitespace())
        .to_lowercase()
}

/// The parts of the browser location the subsystem reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub pathname: String,
}

impl PageLocation {
    #[must_use]
    pub fn new(hostname: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pathname: pathname.into(),
        }
    }

    /// Parse an absolute URL; `None` when it has no host.
    #[must_use]
    pub fn from_url(url: &url::Url) -> Option<Self> {
        Some(Self::new(url.host_str()?, url.path()))
    }
}

/// Decides whether a hostname belongs to the platform or to a tenant.
#[derive(Debug, Clone, Default)]
pub struct DomainClassifier {
    platform_domains: Vec<String>,
    development_hosts: Vec<String>,
}

impl DomainClassifier {
    #[must_use]
    pub fn new(platform_domains: &[String], development_hosts: &[String]) -> Self {
        let normalize_all = |items: &[String]| {
            items
                .iter()
                .map(|d| normalize_domain(d))
                .filter(|d| !d.is_empty())
                .collect()
        };
        Self {
            platform_domains: normalize_all(platform_domains),
            development_hosts: normalize_all(development_hosts),
        }
    }

    #[must_use]
    pub fn from_config(config: &DomainsConfig) -> Self {
        Self::new(&config.platform_domains, &config.development_hosts)
    }

    /// `true` when `hostname` is a candidate tenant domain.
    ///
    /// Empty hosts, development hosts, `*.localhost` names, platform domains
    /// and their subdomains are never custom.
    #[must_use]
    pub fn is_custom(&self, hostname: &str) -> bool {
        let host = normalize_domain(hostname);
        if host.is_empty() || host.ends_with(".localhost") {
            return false;
        }
        if self.development_hosts.contains(&host) {
            return false;
        }
        !self.platform_domains.iter().any(|platform| {
            host == *platform
                || host
                    .strip_suffix(platform.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Custom-domain lookups on top of a privileged lookup channel.
pub struct DomainLookupService {
    classifier: DomainClassifier,
    client: Arc<dyn BrandingLookupClient>,
    defaults: BrandingSettings,
}

impl DomainLookupService {
    #[must_use]
    pub fn new(
        classifier: DomainClassifier,
        client: Arc<dyn BrandingLookupClient>,
        defaults: BrandingSettings,
    ) -> Self {
        Self {
            classifier,
            client,
            defaults,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &DomainClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn is_custom_domain(&self, location: &PageLocation) -> bool {
        self.classifier.is_custom(&location.hostname)
    }

    /// Normalized hostname of `location`.
    #[must_use]
    pub fn current_domain(location: &PageLocation) -> String {
        normalize_domain(&location.hostname)
    }

    /// Look `domain` up on the channel after normalizing it.
    ///
    /// # Errors
    ///
    /// Failures of the channel itself; an unknown domain is `Ok(NotFound)`.
    #[instrument(skip(self), fields(domain = %normalize_domain(domain)))]
    pub async fn branding_by_domain(&self, domain: &str) -> Result<DomainLookup, LookupError> {
        let domain = normalize_domain(domain);
        self.client.branding_by_domain(&domain).await
    }

    /// Resolve `hostname` to the tri-state outcome.
    ///
    /// Non-custom hosts return `NotCustom` without touching the channel.
    ///
    /// # Errors
    ///
    /// Failures of the channel itself.
    pub async fn resolve(&self, hostname: &str) -> Result<DomainResolution, LookupError> {
        if !self.classifier.is_custom(hostname) {
            return Ok(DomainResolution::NotCustom);
        }

        let domain = normalize_domain(hostname);
        match self.branding_by_domain(&domain).await? {
            DomainLookup::NotFound => {
                tracing::debug!(%domain, "custom domain not configured or not verified");
                Ok(DomainResolution::Unverified { domain })
            }
            DomainLookup::Found(record) => {
                let branding = DomainBranding {
                    user_id: record.user_id,
                    settings: record.branding.into_settings(&self.defaults),
                };
                Ok(DomainResolution::Found { domain, branding })
            }
        }
    }
}
