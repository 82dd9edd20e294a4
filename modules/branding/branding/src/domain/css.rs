//! Projection of branding colors onto CSS custom properties.

use std::sync::Arc;

use branding_sdk::BrandingSettings;

use super::color::{Hsl, Rgb};
use super::ports::CssVariableSink;

pub const PRIMARY: &str = "--primary";
pub const SIDEBAR_PRIMARY: &str = "--sidebar-primary";
pub const SIDEBAR_ACCENT: &str = "--sidebar-accent";

/// Every property written by [`BrandingStyles`].
pub const BRANDING_PROPERTIES: [&str; 3] = [PRIMARY, SIDEBAR_PRIMARY, SIDEBAR_ACCENT];

/// Branding colors applied to a style sink for as long as the guard lives.
///
/// Dropping the guard removes the properties so the stylesheet defaults
/// apply again.
pub struct BrandingStyles {
    sink: Arc<dyn CssVariableSink>,
}

impl BrandingStyles {
    #[must_use]
    pub fn apply(sink: Arc<dyn CssVariableSink>, settings: &BrandingSettings) -> Self {
        let styles = Self { sink };
        styles.update(settings);
        styles
    }

    /// Re-apply after the branding changed.
    pub fn update(&self, settings: &BrandingSettings) {
        for (property, hex) in [
            (PRIMARY, &settings.primary_color),
            (SIDEBAR_PRIMARY, &settings.primary_color),
            (SIDEBAR_ACCENT, &settings.secondary_color),
        ] {
            match Rgb::parse_hex(hex) {
                Ok(rgb) => {
                    let hsl = Hsl::from(rgb).to_string();
                    self.sink.set_property(property, &hsl);
                }
                Err(e) => {
                    tracing::warn!(
                        property,
                        error = %e,
                        "invalid branding color, using stylesheet default"
                    );
                    self.sink.remove_property(property);
                }
            }
        }
    }
}

impl Drop for BrandingStyles {
    fn drop(&mut self) {
        for property in BRANDING_PROPERTIES {
            self.sink.remove_property(property);
        }
    }
}
