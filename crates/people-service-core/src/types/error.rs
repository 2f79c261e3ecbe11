//! Error types and handling for the people service
//!
//! Every store operation reports failures through this type. Errors that
//! map to a specific HTTP status expose it through [`Error::http_status`];
//! the API layer falls back to 500 for everything else.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the people service
#[derive(Error, Debug)]
pub enum Error {
    /// The request named something the store cannot act on
    #[error("{0}")]
    BadRequest(String),

    /// An operation was attempted while the store is disconnected
    #[error("not connected to database")]
    NotConnected,

    /// The caller broke the store contract (programming error, not bad data)
    #[error("{0}")]
    Misuse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a contract misuse error
    pub fn misuse(msg: impl Into<String>) -> Self {
        Self::Misuse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The HTTP status this error asks to be reported with, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::BadRequest(_) => Some(400),
            Error::NotConnected => Some(500),
            Error::Misuse(_) | Error::Config(_) | Error::Serialization(_) | Error::Io(_) => None,
        }
    }

    /// Render the error and its source chain, one cause per line
    pub fn stack(&self) -> String {
        let mut stack = format!("Error: {}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            stack.push_str(&format!("\n    caused by: {}", cause));
            source = cause.source();
        }
        stack
    }

    /// Check if this is a client error (4xx equivalent)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::BadRequest(_))
    }

    /// Check if this is a server error (5xx equivalent)
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }
}
