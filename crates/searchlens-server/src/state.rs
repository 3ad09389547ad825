use std::sync::Arc;

use searchlens_core::config::Config;
use searchlens_core::provider::GoogleDataProvider;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// The provider is a trait object so integration tests can swap the
/// HTTP client for an in-process stub.
pub struct AppState {
    pub provider: Arc<dyn GoogleDataProvider>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(provider: Arc<dyn GoogleDataProvider>, config: Config) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }
}
