//! Application Factory
//!
//! Builds the [`AppState`] with the database adaptor named in the
//! configuration. The adaptor is returned disconnected; callers decide when
//! to connect it.

use std::sync::Arc;
use crate::core::app_state::AppState;
use crate::core::config::{Config, StorageType};
use crate::storage::{DocumentDatabase, InMemoryDb};
use crate::types::{Error, Result};
use crate::log_info;

/// Create AppState based on configuration
///
/// # Errors
///
/// Returns a configuration error when the storage type has no adaptor in
/// this build.
pub fn create_app_state(config: Config) -> Result<AppState> {
    log_info!("Creating AppState with storage type: {}", config.storage.storage_type);

    let db: Arc<dyn DocumentDatabase> = match config.storage.storage_type {
        StorageType::InMemoryDb => {
            let db = InMemoryDb::new(config.storage.name.clone(), config.storage.typename.clone());
            log_info!(db = %db.name(), typename = %db.typename(), "InMemoryDb initialized");
            Arc::new(db)
        }
        StorageType::MongoDb => {
            return Err(Error::config(format!(
                "Unsupported storage type: {} (no adaptor in this build)",
                StorageType::MongoDb
            )));
        }
    };

    Ok(AppState::new(db, config))
}
