// Transport trait for issuing partial-content requests
use crate::domain::request::{Method, Payload};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
    pub payload: Option<Payload>,
    pub headers: Vec<(String, String)>,
}

impl TransportRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Any answer the server gave, successful or not.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// 2xx and 304 count as success, like a browser XHR.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) || self.status == 304
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection failed: {0}")]
    Connection(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return whatever status the server answered with.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
