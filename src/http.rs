//! Outbound HTTP transport used to reach the upstream services

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

const USER_AGENT: &str = concat!("clima/", env!("CARGO_PKG_VERSION"));

/// Status line and decoded body of an upstream answer
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// `None` when the body is empty or not valid JSON
    pub json: Option<Value>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, json: Option<Value>) -> Self {
        Self { status, json }
    }
}

/// The request never produced a response (connect, DNS, timeout, body read)
#[derive(Error, Debug)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    timed_out: bool,
}

impl TransportError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            timed_out: err.is_timeout(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET; the implementation enforces its own timeout.
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError>;
}

/// `HttpClient` backed by a shared reqwest connection pool
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| "Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    #[tracing::instrument(name = "http_get", level = "debug", skip(self))]
    async fn get(&self, url: &str) -> std::result::Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        tracing::debug!(status, bytes = body.len(), "Upstream answered");

        Ok(HttpResponse {
            status,
            json: serde_json::from_slice(&body).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_keeps_timeout_flag() {
        assert!(TransportError::timeout("deadline elapsed").is_timeout());
        let err = TransportError::new("connection refused");
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "connection refused");
    }
}
