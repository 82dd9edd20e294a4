//! Privileged lookup channel over HTTP.
//!
//! Both lookups are `GET` requests authenticated with the platform credential
//! from [`LookupConfig`], never with the visitor's own token.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use branding_sdk::{BrandingLookupClient, BrandingRecord, DomainLookup, DomainRecord, LookupError};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use crate::config::LookupConfig;

/// Body of the branding-by-domain endpoint.
#[derive(Debug, Deserialize)]
struct DomainResponse {
    #[serde(default)]
    found: bool,
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    branding: Option<BrandingRecord>,
}

impl DomainResponse {
    fn into_lookup(self) -> Result<DomainLookup, LookupError> {
        if !self.found {
            return Ok(DomainLookup::NotFound);
        }
        match (self.user_id, self.branding) {
            (Some(user_id), Some(branding)) => {
                Ok(DomainLookup::Found(DomainRecord { user_id, branding }))
            }
            _ => Err(LookupError::Malformed(
                "found domain is missing user_id or branding".to_owned(),
            )),
        }
    }
}

pub struct HttpBrandingLookupClient {
    http: reqwest::Client,
    by_email: Url,
    by_domain: Url,
    credential: Option<SecretString>,
    domain_timeout: Option<Duration>,
}

impl HttpBrandingLookupClient {
    /// # Errors
    ///
    /// An endpoint URL that does not parse, or an HTTP client that cannot be
    /// built.
    pub fn from_config(config: &LookupConfig) -> anyhow::Result<Self> {
        let endpoint = |path: &str| {
            let raw = format!("{}{}", config.base_url.trim_end_matches('/'), path);
            Url::parse(&raw).with_context(|| format!("invalid lookup endpoint: {raw}"))
        };

        let http = reqwest::Client::builder()
            .user_agent(concat!("cf-branding/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build lookup HTTP client")?;

        Ok(Self {
            http,
            by_email: endpoint(&config.by_email_path)?,
            by_domain: endpoint(&config.by_domain_path)?,
            credential: config
                .platform_credential
                .as_ref()
                .map(|c| SecretString::from(c.expose_secret().to_owned())),
            domain_timeout: config.domain_timeout,
        })
    }

    fn get(&self, url: &Url, param: (&str, &str)) -> reqwest::RequestBuilder {
        let request = self.http.get(url.clone()).query(&[param]);
        match &self.credential {
            Some(credential) => request.bearer_auth(credential.expose_secret()),
            None => request,
        }
    }

    fn transport_error(&self, e: &reqwest::Error) -> LookupError {
        match self.domain_timeout {
            Some(timeout) if e.is_timeout() => LookupError::Timeout(timeout),
            _ => LookupError::Transport(e.to_string()),
        }
    }
}

fn malformed(e: &reqwest::Error) -> LookupError {
    LookupError::Malformed(e.to_string())
}

#[async_trait]
impl BrandingLookupClient for HttpBrandingLookupClient {
    async fn branding_by_email(&self, email: &str) -> Result<BrandingRecord, LookupError> {
        let response = self
            .get(&self.by_email, ("email", email))
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        response.json().await.map_err(|e| malformed(&e))
    }

    async fn branding_by_domain(&self, domain: &str) -> Result<DomainLookup, LookupError> {
        let mut request = self.get(&self.by_domain, ("domain", domain));
        if let Some(timeout) = self.domain_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(DomainLookup::NotFound);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: DomainResponse = response.json().await.map_err(|e| malformed(&e))?;
        body.into_lookup()
    }
}
