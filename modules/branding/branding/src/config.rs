//! Configuration for the branding module.
//!
//! Layered with figment: defaults, then an optional YAML file, then
//! environment variables prefixed with `BRANDING__` (`__` separates levels):
//!
//! ```yaml
//! lookup:
//!   base_url: "https://rows.example.com/functions/v1"
//!   platform_credential: "service-key"
//!   email_timeout: "10s"
//! domains:
//!   platform_domains: ["voxtro.io"]
//! defaults:
//!   primary_color: "#f97316"
//!   secondary_color: "#ea580c"
//! persistence:
//!   debounce: "300ms"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use branding_sdk::{BrandingSettings, PLATFORM_PRIMARY_COLOR, PLATFORM_SECONDARY_COLOR};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::color::is_valid_hex;

/// Module configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandingConfig {
    pub lookup: LookupConfig,
    pub domains: DomainsConfig,
    pub defaults: DefaultsConfig,
    pub persistence: PersistenceConfig,
    pub theme: ThemeConfig,
}

/// Privileged lookup channel settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Base URL the lookup paths are appended to.
    pub base_url: String,

    pub by_email_path: String,

    pub by_domain_path: String,

    /// Platform bearer credential. Never the visitor's own token.
    #[serde(serialize_with = "serialize_redacted")]
    pub platform_credential: Option<SecretString>,

    /// Upper bound for the branding-by-email lookup.
    #[serde(with = "humantime_duration")]
    pub email_timeout: Duration,

    /// Optional bound for the domain lookup; transport default when unset.
    #[serde(with = "humantime_duration::option")]
    pub domain_timeout: Option<Duration>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321/functions/v1".to_owned(),
            by_email_path: "/get-branding-by-email".to_owned(),
            by_domain_path: "/get-branding-by-domain".to_owned(),
            platform_credential: None,
            email_timeout: Duration::from_secs(10),
            domain_timeout: None,
        }
    }
}

/// Hostname classification rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainsConfig {
    /// Domains owned by the platform. A host equal to one of these, or a
    /// subdomain of one, is never a custom domain.
    pub platform_domains: Vec<String>,

    /// Loopback and development hosts, matched exactly.
    pub development_hosts: Vec<String>,
}

/// Base domain the portal itself is served from.
pub const DEFAULT_PLATFORM_DOMAIN: &str = "voxtro.io";

impl Default for DomainsConfig {
    fn default() -> Self {
        Self {
            platform_domains: vec![DEFAULT_PLATFORM_DOMAIN.to_owned()],
            development_hosts: ["localhost", "127.0.0.1", "0.0.0.0", "::1", "[::1]"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Platform branding used when no tenant override exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsConfig {
    pub primary_color: String,
    pub secondary_color: String,
    /// Platform logo shown when a tenant has none.
    pub logo_url: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            primary_color: PLATFORM_PRIMARY_COLOR.to_owned(),
            secondary_color: PLATFORM_SECONDARY_COLOR.to_owned(),
            logo_url: "/logo.svg".to_owned(),
        }
    }
}

impl DefaultsConfig {
    /// Default branding record: configured colors, no tenant logo.
    #[must_use]
    pub fn settings(&self) -> BrandingSettings {
        BrandingSettings {
            logo_url: None,
            primary_color: self.primary_color.clone(),
            secondary_color: self.secondary_color.clone(),
        }
    }
}

/// Persisted form state settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistenceConfig {
    #[serde(with = "humantime_duration")]
    pub debounce: Duration,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
        }
    }
}

/// Theme storage partitioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Route prefix of the tenant-customer portal.
    pub customer_path_prefix: String,
    pub customer_storage_key: String,
    pub staff_storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            customer_path_prefix: "/customer".to_owned(),
            customer_storage_key: "customer-portal-theme".to_owned(),
            staff_storage_key: "staff-portal-theme".to_owned(),
        }
    }
}

impl BrandingConfig {
    /// Environment variable prefix; `__` separates nesting levels.
    pub const ENV_PREFIX: &'static str = "BRANDING__";

    /// Load defaults, then `path` (YAML) if given, then the environment.
    ///
    /// # Errors
    ///
    /// A missing file, an unparsable layer, or a configuration that fails
    /// [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load branding configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Invalid default colors, an unparsable `base_url`, a zero email
    /// timeout, or a missing or blank platform domain.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (field, color) in [
            ("defaults.primary_color", &self.defaults.primary_color),
            ("defaults.secondary_color", &self.defaults.secondary_color),
        ] {
            if !is_valid_hex(color) {
                bail!("{field} is not a hex color: {color:?}");
            }
        }

        url::Url::parse(&self.lookup.base_url)
            .with_context(|| format!("lookup.base_url is not a URL: {}", self.lookup.base_url))?;

        if self.lookup.email_timeout.is_zero() {
            bail!("lookup.email_timeout must be greater than zero");
        }

        if self.domains.platform_domains.is_empty() {
            bail!("domains.platform_domains must name at least one platform domain");
        }
        if self
            .domains
            .platform_domains
            .iter()
            .any(|d| d.trim().is_empty())
        {
            bail!("domains.platform_domains contains a blank entry");
        }

        Ok(())
    }
}

#[allow(clippy::ref_option)]
fn serialize_redacted<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(_) => serializer.serialize_str("[REDACTED]"),
        None => serializer.serialize_none(),
    }
}

/// Durations written in humantime form (`"10s"`, `"300ms"`).
mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => super::serialize(d, s),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
            Option::<String>::deserialize(d)?
                .map(|raw| humantime::parse_duration(&raw))
                .transpose()
                .map_err(serde::de::Error::custom)
        }
    }
}
