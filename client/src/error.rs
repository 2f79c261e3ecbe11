//! Error types for the people client

use thiserror::Error;

/// Result type returned by client operations
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failures seen by a caller of the people endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with an error envelope
    #[error("{message}")]
    Server {
        /// HTTP status of the reply
        status: u16,
        /// Server-supplied message
        message: String,
        /// Server-supplied stack, when the server exposes it
        stack: Option<String>,
    },

    /// The server answered with a failure status and no body
    #[error("Request failed with status {0}")]
    Status(u16),

    /// Request or response JSON could not be processed
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The reply was well formed but not the shape the action returns
    #[error("Unexpected response payload: {0}")]
    UnexpectedPayload(String),
}

impl ClientError {
    /// Wrap any transport-level failure
    pub fn transport(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ClientError::Transport(error.into())
    }

    /// HTTP status of the reply, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::transport(error)
    }
}
