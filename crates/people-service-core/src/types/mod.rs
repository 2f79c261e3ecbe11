//! Type definitions for the people service
//!
//! This module contains all type definitions organized by category.

/// Identifier types
pub mod ids;
/// Schema-free records stored by the database
pub mod record;
/// Request/response envelopes shared by server and client
pub mod envelope;
/// Typed view over person records
pub mod person;
/// System-wide error types
pub mod error;

/// Query conditions: field name to required value
pub type Conditions = serde_json::Map<String, serde_json::Value>;

/// Field projection (accepted, not applied by the in-memory store)
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Sort specification (accepted, not applied by the in-memory store)
pub type Sort = serde_json::Map<String, serde_json::Value>;

// Re-export commonly used types for convenience
pub use ids::{ObjectId, ObjectIdGenerator};
pub use record::Record;
pub use error::{Error, Result};
pub use person::{Person, Name, ContactMethod, Location, full_name};
