//! Core application logic and configuration

/// Application configuration
pub mod config;

/// Logging macros and subscriber setup
pub mod logging;

/// Application state management
pub mod app_state;

/// Factory for building the configured state
pub mod factory;

// Re-export commonly used items
pub use config::{Config, Environment, StorageType, load_config, load_config_or_default};
pub use app_state::AppState;
pub use factory::create_app_state;
pub use logging::init_logging;
