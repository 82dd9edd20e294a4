pub mod branding_context;
pub mod branding_lookup;
pub mod color;
pub mod css;
pub mod custom_domain_context;
pub mod domain_lookup;
pub mod error;
pub mod persisted_state;
pub mod ports;
pub mod state;
pub mod theme;

#[cfg(test)]
mod branding_context_test;
#[cfg(test)]
mod test_support;
