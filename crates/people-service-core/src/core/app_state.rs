//! Shared application state
//!
//! Handed to every request handler. Cloning only bumps reference counts.

use std::sync::Arc;
use crate::core::config::Config;
use crate::storage::DocumentDatabase;

/// Central application state holding the database and configuration
#[derive(Clone)]
pub struct AppState {
    /// Configured database adaptor
    pub db: Arc<dyn DocumentDatabase>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState around an already built adaptor
    pub fn new(db: Arc<dyn DocumentDatabase>, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Whether error details may be sent to callers
    pub fn exposes_errors(&self) -> bool {
        self.config.server.environment.exposes_errors()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("connected", &self.db.is_connected())
            .field("config", &self.config)
            .finish()
    }
}
