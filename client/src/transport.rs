//! Transport abstraction for the people client.
//!
//! The client only needs "post these bytes, give me status and body". The
//! HTTP implementation uses `reqwest`; tests plug in in-process transports.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use people_service_core::core::config::ClientConfig;

use crate::error::ClientResult;

/// Raw reply from the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, possibly empty
    pub body: Vec<u8>,
}

/// Something that can deliver a JSON request body to the people endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// Post a JSON body and return the raw reply
    async fn post(&self, body: Vec<u8>) -> ClientResult<TransportResponse>;
}

/// HTTP transport posting to a single endpoint URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport for `url` with a per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url: url.into(), client })
    }

    /// Creates a transport from the client configuration section
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.service_url.clone(), config.timeout)
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, body: Vec<u8>) -> ClientResult<TransportResponse> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse { status, body })
    }
}
