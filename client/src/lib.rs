//! # People Service Client
//!
//! Async client for the people endpoint. Every operation builds a request
//! envelope, posts it to the configured service URL and resolves with the
//! envelope's `data`, or fails with the server's error.

#![warn(missing_docs)]

/// Client error types
pub mod error;

/// Transport trait and the HTTP implementation
pub mod transport;

/// Envelope-level client operations
pub mod people_client;

pub use error::{ClientError, ClientResult};
pub use people_client::PeopleClient;
pub use transport::{HttpTransport, Transport, TransportResponse};
