use std::sync::Arc;

use crate::config::AppConfig;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    /// Live connection registry, owned here for the server's lifetime.
    pub registry: Arc<ConnectionRegistry>,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(AppState {
            registry: ConnectionRegistry::new(),
            config,
            start_time: std::time::Instant::now(),
        })
    }
}
