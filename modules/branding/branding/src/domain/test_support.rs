//! Scripted collaborators shared by the domain tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use branding_sdk::{
    AuthClient, AuthError, AuthEvent, AuthSession, BrandingLookupClient, BrandingRecord,
    DomainLookup, LookupError,
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

type EmailReply = (Duration, Result<BrandingRecord, LookupError>);

/// Lookup channel answering from per-test scripts.
///
/// Email replies are consumed in call order, each after its own delay; once
/// the script is exhausted every call returns an empty record. Unscripted
/// domains are `NotFound`.
#[derive(Default)]
pub struct ScriptedLookup {
    email_replies: Mutex<VecDeque<EmailReply>>,
    domains: Mutex<HashMap<String, Result<DomainLookup, LookupError>>>,
    seen_domains: Mutex<Vec<String>>,
    pub email_calls: AtomicUsize,
    pub domain_calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn push_email(&self, delay: Duration, reply: Result<BrandingRecord, LookupError>) {
        self.email_replies.lock().push_back((delay, reply));
    }

    pub fn set_domain(&self, domain: &str, reply: Result<DomainLookup, LookupError>) {
        self.domains.lock().insert(domain.to_owned(), reply);
    }

    pub fn last_domain(&self) -> Option<String> {
        self.seen_domains.lock().last().cloned()
    }
}

#[async_trait]
impl BrandingLookupClient for ScriptedLookup {
    async fn branding_by_email(&self, _email: &str) -> Result<BrandingRecord, LookupError> {
        self.email_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.email_replies.lock().pop_front();
        match next {
            Some((delay, reply)) => {
                tokio::time::sleep(delay).await;
                reply
            }
            None => Ok(BrandingRecord::default()),
        }
    }

    async fn branding_by_domain(&self, domain: &str) -> Result<DomainLookup, LookupError> {
        self.domain_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_domains.lock().push(domain.to_owned());
        self.domains
            .lock()
            .get(domain)
            .cloned()
            .unwrap_or(Ok(DomainLookup::NotFound))
    }
}

/// Auth collaborator whose session can never be read.
pub struct UnavailableAuth {
    events: broadcast::Sender<AuthEvent>,
}

impl Default for UnavailableAuth {
    fn default() -> Self {
        Self {
            events: broadcast::channel(4).0,
        }
    }
}

#[async_trait]
impl AuthClient for UnavailableAuth {
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Err(AuthError::SessionUnavailable("token store locked".to_owned()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

/// A branding record carrying only a primary color.
pub fn primary(color: &str) -> BrandingRecord {
    BrandingRecord {
        primary_color: Some(color.to_owned()),
        ..BrandingRecord::default()
    }
}
