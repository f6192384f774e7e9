//! Application state shared across handlers.

use pharos_core::config::AppConfig;
use pharos_index::IndexingService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The query resolution engine.
    pub service: Arc<IndexingService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if configuration validation fails; the server must not start
    /// with an invalid configuration.
    pub fn new(config: AppConfig, service: Arc<IndexingService>) -> Self {
        if let Err(error) = config.validate() {
            panic!("invalid configuration: {error}");
        }
        Self {
            config: Arc::new(config),
            service,
        }
    }
}
