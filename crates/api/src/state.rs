//! Shared application state

use std::sync::Arc;

use crate::config::Config;

/// State handed to every handler. Configuration is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
