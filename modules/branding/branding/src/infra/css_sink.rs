//! In-memory stand-in for the document root's inline style.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use crate::domain::ports::CssVariableSink;

/// Custom properties set on `:root`, kept in name order.
#[derive(Debug, Default)]
pub struct RootStyleSheet {
    properties: Mutex<BTreeMap<String, String>>,
}

impl RootStyleSheet {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.properties.lock().get(name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.lock().is_empty()
    }

    /// Render as a `:root { ... }` block; empty when nothing is set.
    #[must_use]
    pub fn render(&self) -> String {
        let properties = self.properties.lock();
        if properties.is_empty() {
            return String::new();
        }
        let mut css = properties
            .iter()
            .fold(String::from(":root {\n"), |mut block, (name, value)| {
                block.push_str("  ");
                block.push_str(name);
                block.push_str(": ");
                block.push_str(value);
                block.push_str(";\n");
                block
            });
        css.push('}');
        css
    }
}

impl CssVariableSink for RootStyleSheet {
    fn set_property(&self, name: &str, value: &str) {
        self.properties
            .lock()
            .insert(name.to_owned(), value.to_owned());
    }

    fn remove_property(&self, name: &str) {
        self.properties.lock().remove(name);
    }
}
