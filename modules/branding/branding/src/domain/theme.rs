//! Per-portal storage namespaces for the light/dark preference.
//!
//! Staff and tenant customers can share a browser; each portal keeps its own
//! theme under a separate key.

use crate::config::ThemeConfig;

pub const CUSTOMER_THEME_KEY: &str = "customer-portal-theme";
pub const STAFF_THEME_KEY: &str = "staff-portal-theme";

const CUSTOMER_PATH_PREFIX: &str = "/customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Portal {
    Customer,
    Staff,
}

impl Portal {
    /// Portal serving `path` under the default route layout.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        if has_segment_prefix(path, CUSTOMER_PATH_PREFIX) {
            Self::Customer
        } else {
            Self::Staff
        }
    }
}

/// Storage key for `path` under the default route layout.
#[must_use]
pub fn theme_storage_key(path: &str) -> &'static str {
    match Portal::for_path(path) {
        Portal::Customer => CUSTOMER_THEME_KEY,
        Portal::Staff => STAFF_THEME_KEY,
    }
}

/// Configurable variant of [`theme_storage_key`].
#[derive(Debug, Clone)]
pub struct ThemePartitioner {
    customer_prefix: String,
    customer_key: String,
    staff_key: String,
}

impl ThemePartitioner {
    #[must_use]
    pub fn from_config(config: &ThemeConfig) -> Self {
        let prefix = config.customer_path_prefix.trim_end_matches('/');
        Self {
            customer_prefix: if prefix.starts_with('/') {
                prefix.to_owned()
            } else {
                format!("/{prefix}")
            },
            customer_key: config.customer_storage_key.clone(),
            staff_key: config.staff_storage_key.clone(),
        }
    }

    #[must_use]
    pub fn portal(&self, path: &str) -> Portal {
        if has_segment_prefix(path, &self.customer_prefix) {
            Portal::Customer
        } else {
            Portal::Staff
        }
    }

    #[must_use]
    pub fn storage_key(&self, path: &str) -> &str {
        match self.portal(path) {
            Portal::Customer => &self.customer_key,
            Portal::Staff => &self.staff_key,
        }
    }
}

impl Default for ThemePartitioner {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

/// `/customer` and `/customer/...` match `/customer`; `/customers` does not.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    let Some(rest) = path.strip_prefix(prefix) else {
        return false;
    };
    rest.is_empty() || rest.starts_with(['/', '?', '#'])
}
