use std::sync::Arc;
use flock_core::{Config, JobQueue, JobStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            config,
            store,
            queue,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &dyn JobStore {
        self.store.as_ref()
    }

    pub fn queue(&self) -> &dyn JobQueue {
        self.queue.as_ref()
    }
}
