//! Ports to the browser-side collaborators of the branding module.

use super::error::StorageError;

/// Key/value string store scoped to one browser tab session.
///
/// Keys are chosen by callers and shared across every component using the
/// same key; callers must namespace them (e.g. by form identity).
pub trait SessionStore: Send + Sync {
    /// # Errors
    ///
    /// Backend failure while reading.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Quota exhaustion or backend failure while writing.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Backend failure while deleting.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Custom-property sink on the document root.
pub trait CssVariableSink: Send + Sync {
    fn set_property(&self, name: &str, value: &str);

    /// Revert `name` to its stylesheet default.
    fn remove_property(&self, name: &str);
}
