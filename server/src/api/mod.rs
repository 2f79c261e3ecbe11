//! HTTP API module for the people server

/// HTTP request handlers
pub mod api_handlers;

/// Router construction and server lifecycle
pub mod api_server;
