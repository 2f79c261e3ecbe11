//! # People Service Server
//!
//! HTTP front end for the people service. A single endpoint accepts a
//! request envelope, runs the named action against the configured document
//! database and answers with a response envelope.

#![warn(missing_docs)]

/// HTTP API handlers and routing
pub mod api;

// Re-export the pieces binaries and tests need
pub use api::api_server::{create_router, shutdown_signal, start_api_server};
