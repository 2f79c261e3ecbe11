//! Storage layer for the people service
//!
//! This module provides the document database contract that the API layer
//! talks to, so that different adaptors can be plugged in without changing
//! the handler. `InMemoryDb` is the in-process reference implementation.

use async_trait::async_trait;
use crate::types::{Conditions, Fields, Record, Result, Sort};
use crate::types::envelope::{Cursor, UpdateFieldCommand};

/// Trait for document database adaptors
///
/// Every operation completes asynchronously, whether or not the adaptor
/// does any I/O. Returned records are always independent copies; mutating
/// them never affects stored state.
#[async_trait]
pub trait DocumentDatabase: Send + Sync {
    /// Open the database; operations fail until this succeeds
    async fn connect(&self) -> Result<()>;

    /// Close the database
    async fn disconnect(&self) -> Result<()>;

    /// Whether the database is currently connected
    fn is_connected(&self) -> bool;

    /// Store a new record under a freshly generated `_id`
    ///
    /// The record must not already carry an `_id`.
    async fn create(&self, obj: &Record) -> Result<Record>;

    /// Fetch the record with the given `_id`
    async fn read(&self, id: Option<&str>) -> Result<Record>;

    /// Overwrite an existing record, matched by its `_id`
    async fn replace(&self, obj: &Record) -> Result<Record>;

    /// Apply exactly one `set` command to the record matched by `conditions._id`
    ///
    /// A `set` without a `value` removes the field from the record.
    async fn update(&self, conditions: &Conditions, updates: &[UpdateFieldCommand]) -> Result<Record>;

    /// Remove the record with the given `_id`; removing an absent record succeeds
    async fn del(&self, id: Option<&str>) -> Result<()>;

    /// List records matching a single-field equality condition
    ///
    /// `fields` and `sort` are part of the contract; adaptors may ignore them.
    async fn find(
        &self,
        conditions: Option<&Conditions>,
        fields: Option<&Fields>,
        sort: Option<&Sort>,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<Record>>;
}

/// In-memory reference store
pub mod in_memory;

/// Re-export main storage types
pub use in_memory::InMemoryDb;
