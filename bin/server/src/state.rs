//! Server application state

use relay::Relay;

/// Shared by every request handler
pub struct AppState {
    pub relay: Relay,
    /// Public base URL, without trailing slash
    pub base_url: String,
}

impl AppState {
    pub fn new(relay: Relay, base_url: impl Into<String>) -> Self {
        Self {
            relay,
            base_url: base_url.into(),
        }
    }
}
