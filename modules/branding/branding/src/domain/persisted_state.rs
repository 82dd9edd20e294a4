//! Debounced, session-scoped persistence of form drafts.
//!
//! A [`PersistedState`] keeps the authoritative value in memory and mirrors
//! it into a [`SessionStore`] after a quiet period. Writes of the initial
//! value or of an empty value delete the entry instead, so the store never
//! holds no-op values.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::task::AbortHandle;

use super::error::StorageError;
use super::ports::SessionStore;

/// Quiet period before a changed value is written.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A value mirrored into the session store under a caller-chosen key.
///
/// Clones share the same value and pending write. Dropping the last clone
/// cancels a write that has not fired yet.
pub struct PersistedState<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PersistedState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    value: Mutex<T>,
    slot: Arc<Slot<T>>,
    debounce: Duration,
}

/// The store entry and its single pending write.
struct Slot<T> {
    key: String,
    initial: T,
    store: Arc<dyn SessionStore>,
    pending: Mutex<Pending>,
}

#[derive(Default)]
struct Pending {
    /// Bumped by every schedule/clear; a write only lands if its epoch is current.
    epoch: u64,
    task: Option<AbortHandle>,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    /// Restore `key` from `store`, falling back to `initial`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, key: impl Into<String>, initial: T) -> Self {
        Self::with_debounce(store, key, initial, DEFAULT_DEBOUNCE)
    }

    #[must_use]
    pub fn with_debounce(
        store: Arc<dyn SessionStore>,
        key: impl Into<String>,
        initial: T,
        debounce: Duration,
    ) -> Self {
        let slot = Slot {
            key: key.into(),
            initial,
            store,
            pending: Mutex::new(Pending::default()),
        };
        let value = slot.restore();

        Self {
            inner: Arc::new(Inner {
                value: Mutex::new(value),
                slot: Arc::new(slot),
                debounce,
            }),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.slot.key
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    /// Replace the value and schedule a debounced write.
    pub fn set(&self, value: T) {
        *self.inner.value.lock() = value.clone();
        self.schedule(value);
    }

    /// Mutate the value in place and schedule a debounced write.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let snapshot = {
            let mut value = self.inner.value.lock();
            f(&mut value);
            value.clone()
        };
        self.schedule(snapshot);
    }

    /// Drop the stored entry and reset to the initial value, immediately.
    ///
    /// Meant for right after a successful submission.
    pub fn clear(&self) {
        {
            let mut pending = self.inner.slot.pending.lock();
            pending.supersede();
            self.inner.slot.remove();
        }
        *self.inner.value.lock() = self.inner.slot.initial.clone();
    }

    /// Write the pending value now instead of waiting for the debounce.
    pub fn flush(&self) {
        let mut pending = self.inner.slot.pending.lock();
        if pending.task.is_some() {
            pending.supersede();
            let value = self.inner.value.lock().clone();
            self.inner.slot.write(&value);
        }
    }

    fn schedule(&self, value: T) {
        let slot = Arc::clone(&self.inner.slot);
        let mut pending = slot.pending.lock();
        let epoch = pending.supersede();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            slot.write(&value);
            return;
        };

        let debounce = self.inner.debounce;
        let task_slot = Arc::clone(&slot);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            task_slot.write_if_current(epoch, &value);
        });
        pending.task = Some(handle.abort_handle());
    }
}

impl Pending {
    /// Cancel the scheduled write, if any, and return the new epoch.
    fn supersede(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.epoch += 1;
        self.epoch
    }
}

impl<T> Slot<T> {
    fn cancel_pending(&self) {
        self.pending.lock().supersede();
    }

    fn remove(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to remove persisted state");
        }
    }
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq,
{
    fn restore(&self) -> T {
        match self.load() {
            Ok(Some(value)) => value,
            Ok(None) => self.initial.clone(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read persisted state");
                self.initial.clone()
            }
        }
    }

    fn load(&self) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn write_if_current(&self, epoch: u64, value: &T) {
        let mut pending = self.pending.lock();
        if pending.epoch != epoch {
            return;
        }
        pending.task = None;
        self.write(value);
    }

    fn write(&self, value: &T) {
        if let Err(e) = self.persist(value) {
            tracing::warn!(key = %self.key, error = %e, "failed to persist state");
        }
    }

    /// The initial value and blank values delete the entry instead.
    fn persist(&self, value: &T) -> Result<(), StorageError> {
        if *value == self.initial {
            return self.store.remove(&self.key);
        }
        let json = serde_json::to_value(value)?;
        if is_blank(&json) {
            return self.store.remove(&self.key);
        }
        self.store.set(&self.key, &json.to_string())
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.slot.cancel_pending();
    }
}

fn is_blank(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}
