pub mod auth;
pub mod css_sink;
pub mod http_lookup;
pub mod session_store;
