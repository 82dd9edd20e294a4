//! Session branding for a mounted subtree.
//!
//! The context fetches branding for the signed-in visitor on mount and keeps
//! it current as authentication events arrive:
//!
//! ```text
//! Init -> Loading -> Ready <-> Refreshing
//!                      ^          |
//!                      +- Loading-+   (SignedIn / refetch_with_loading)
//! ```
//!
//! `loading` is only raised by the mount fetch, `SignedIn` and
//! [`BrandingContext::refetch_with_loading`]. Token refreshes and
//! [`BrandingContext::refetch`] update `branding` in place so forms bound to
//! it are never torn down mid-edit.
//!
//! Fetches may overlap and complete out of order. Each one is stamped with a
//! generation when issued and only the most recently issued fetch may write.
//!
//! [`BrandingContext::project_styles`] binds a CSS sink to the context so the
//! root custom properties follow every change until the context is disposed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use branding_sdk::{AuthClient, AuthEvent, BrandingSettings};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};

use super::branding_lookup::BrandingLookupService;
use super::css::BrandingStyles;
use super::ports::CssVariableSink;
use super::state::StateContainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrandingPhase {
    Init,
    Loading,
    Refreshing,
    Ready,
}

/// What a consumer of the context observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandingState {
    pub branding: Option<BrandingSettings>,
    pub loading: bool,
    pub phase: BrandingPhase,
}

impl Default for BrandingState {
    fn default() -> Self {
        Self {
            branding: None,
            loading: true,
            phase: BrandingPhase::Init,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Raise `loading` until the fetch lands.
    Foreground,
    /// Leave `loading` untouched.
    Background,
}

/// Reactive branding state bound to the lifetime of a mounted subtree.
///
/// Dropping the context unsubscribes from auth events and discards the
/// result of any fetch still in flight.
pub struct BrandingContext {
    shared: Arc<Shared>,
}

struct Shared {
    state: StateContainer<BrandingState>,
    auth: Arc<dyn AuthClient>,
    lookup: Arc<BrandingLookupService>,
    generation: AtomicU64,
}

impl BrandingContext {
    /// Start the initial fetch and listen for auth events.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn mount(auth: Arc<dyn AuthClient>, lookup: Arc<BrandingLookupService>) -> Self {
        let events = auth.subscribe();
        let shared = Arc::new(Shared {
            state: StateContainer::new(BrandingState::default()),
            auth,
            lookup,
            generation: AtomicU64::new(0),
        });

        tracing::info!("branding context mounted");
        shared.issue(FetchMode::Foreground);

        let listener = Arc::clone(&shared);
        shared.state.spawn(listener.listen(events));

        Self { shared }
    }

    #[must_use]
    pub fn state(&self) -> BrandingState {
        self.shared.state.get_state()
    }

    #[must_use]
    pub fn branding(&self) -> Option<BrandingSettings> {
        self.state().branding
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BrandingState> {
        self.shared.state.subscribe()
    }

    /// Refresh without raising `loading`.
    pub fn refetch(&self) {
        self.shared.issue(FetchMode::Background);
    }

    /// Refresh with the full loading indicator.
    pub fn refetch_with_loading(&self) {
        self.shared.issue(FetchMode::Foreground);
    }

    /// Keep `sink` in step with the resolved branding.
    ///
    /// Properties are written once branding is known, rewritten when it
    /// changes and removed when the context is disposed.
    pub fn project_styles(&self, sink: Arc<dyn CssVariableSink>) {
        let mut rx = self.subscribe();
        self.shared.state.spawn(async move {
            let mut projected: Option<(BrandingSettings, BrandingStyles)> = None;
            loop {
                let branding = rx.borrow_and_update().branding.clone();
                if let Some(settings) = branding {
                    projected = Some(match projected.take() {
                        Some((current, styles)) if current == settings => (current, styles),
                        Some((_, styles)) => {
                            styles.update(&settings);
                            (settings, styles)
                        }
                        None => {
                            let styles = BrandingStyles::apply(Arc::clone(&sink), &settings);
                            (settings, styles)
                        }
                    });
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
    }

    /// Wait until no fetch is outstanding. `None` once disposed.
    pub async fn wait_until_ready(&self) -> Option<BrandingState> {
        self.shared
            .state
            .wait_for(|s| s.phase == BrandingPhase::Ready)
            .await
    }

    pub fn dispose(&self) {
        if !self.shared.state.is_disposed() {
            self.shared.state.dispose();
            tracing::info!("branding context disposed");
        }
    }
}

impl Drop for BrandingContext {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    fn issue(self: &Arc<Self>, mode: FetchMode) {
        if self.state.is_disposed() {
            return;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, ?mode, "issuing branding fetch");

        self.state.update(|s| match mode {
            FetchMode::Foreground => {
                let changed = !s.loading || s.phase != BrandingPhase::Loading;
                s.loading = true;
                s.phase = BrandingPhase::Loading;
                changed
            }
            FetchMode::Background if s.phase == BrandingPhase::Ready => {
                s.phase = BrandingPhase::Refreshing;
                true
            }
            FetchMode::Background => false,
        });

        let this = Arc::clone(self);
        self.state.spawn(async move {
            let settings = this.resolve().await;
            this.apply(generation, settings);
        });
    }

    async fn resolve(&self) -> BrandingSettings {
        let email = match self.auth.current_session().await {
            Ok(session) => session
                .and_then(|s| s.email)
                .filter(|email| !email.trim().is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session, using platform defaults");
                return self.lookup.defaults().clone();
            }
        };

        let Some(email) = email else {
            tracing::debug!("no authenticated email, using platform defaults");
            return self.lookup.defaults().clone();
        };
        self.lookup.fetch_by_email_or_default(&email).await
    }

    fn apply(&self, generation: u64, settings: BrandingSettings) {
        self.state.update(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "discarding superseded branding fetch");
                return false;
            }

            let branding_changed = s.branding.as_ref() != Some(&settings);
            if branding_changed {
                s.branding = Some(settings);
            }
            let was_settled = !s.loading && s.phase == BrandingPhase::Ready;
            s.loading = false;
            s.phase = BrandingPhase::Ready;
            branding_changed || !was_settled
        });
    }

    async fn listen(self: Arc<Self>, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            let mode = match events.recv().await {
                Ok(AuthEvent::SignedIn) => FetchMode::Foreground,
                Ok(AuthEvent::TokenRefreshed | AuthEvent::SignedOut | AuthEvent::UserUpdated) => {
                    FetchMode::Background
                }
                Err(RecvError::Lagged(skipped)) => {
                    // One refresh covers the whole backlog; skip to the tail.
                    tracing::warn!(skipped, "auth events lagged, refreshing branding once");
                    events = events.resubscribe();
                    FetchMode::Background
                }
                Err(RecvError::Closed) => break,
            };
            self.issue(mode);
        }
        tracing::debug!("auth event stream closed");
    }
}
