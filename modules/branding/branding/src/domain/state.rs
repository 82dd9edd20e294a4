//! Observable state owned by a mounted context.
//!
//! A [`StateContainer`] pairs a `watch` channel with a cancellation token and
//! a task tracker. Once disposed it accepts no further updates and every task
//! it spawned is abandoned, so nothing writes state after teardown.

use std::future::Future;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub struct StateContainer<S> {
    tx: watch::Sender<S>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl<S> StateContainer<S>
where
    S: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: S) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    #[must_use]
    pub fn get_state(&self) -> S {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Apply `f` under the state lock; subscribers are notified only when it
    /// returns `true`. Ignored once disposed.
    pub fn update(&self, f: impl FnOnce(&mut S) -> bool) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.tx
            .send_if_modified(|state| !self.cancel.is_cancelled() && f(state))
    }

    /// Run `task` until it completes or the container is disposed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            return;
        }
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = task => {}
            }
        });
    }

    /// Wait for a state matching `predicate`; `None` if disposed first.
    pub async fn wait_for(&self, predicate: impl FnMut(&S) -> bool) -> Option<S> {
        let mut rx = self.subscribe();
        tokio::select! {
            () = self.cancel.cancelled() => None,
            state = rx.wait_for(predicate) => state.ok().map(|s| (*s).clone()),
        }
    }

    pub fn dispose(&self) {
        self.cancel.cancel();
        self.tracker.close();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for every spawned task to finish after [`dispose`](Self::dispose).
    pub async fn drained(&self) {
        self.tracker.wait().await;
    }
}
