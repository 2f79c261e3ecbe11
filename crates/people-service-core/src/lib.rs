//! # People Service Core
//!
//! Core types and abstractions for the people micro-service.
//! Holds the request/response envelopes shared by server and client, the
//! document database contract and its in-memory reference store.

#![warn(missing_docs)]

/// Type definitions for all data structures
pub mod types;

/// System constants
pub mod constants;

/// Document database contract and the in-memory store
pub mod storage;

/// Configuration, logging and application wiring
pub mod core;

// Re-export commonly used items
pub use types::{Error, Result, ObjectId, Record};
pub use types::envelope::{Action, Cursor, Data, ErrorBody, Query, Request, Response, UpdateCmd, UpdateFieldCommand};
pub use storage::{DocumentDatabase, InMemoryDb};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
