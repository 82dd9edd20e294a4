//! In-process auth collaborator.

use async_trait::async_trait;
use branding_sdk::{AuthClient, AuthError, AuthEvent, AuthSession};
use parking_lot::RwLock;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it lags.
pub const EVENT_CAPACITY: usize = 16;

/// Auth collaborator holding a fixed session and an event channel the owner
/// publishes to. Used by the probe CLI and by tests.
pub struct StaticAuthClient {
    session: RwLock<Option<AuthSession>>,
    events: broadcast::Sender<AuthEvent>,
}

impl StaticAuthClient {
    #[must_use]
    pub fn new(session: Option<AuthSession>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: RwLock::new(session),
            events,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self::new(Some(AuthSession::with_email(email)))
    }

    pub fn set_session(&self, session: Option<AuthSession>) {
        *self.session.write() = session;
    }

    /// Publish `event`; returns how many subscribers received it.
    pub fn emit(&self, event: AuthEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}

#[async_trait]
impl AuthClient for StaticAuthClient {
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.session.read().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
