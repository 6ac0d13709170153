//! Fetching the state resource.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;

use crate::source::{decode_snapshot, Snapshot};

/// Upper bound for one request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the response.
    #[error("request timed out")]
    Timeout,

    /// Any other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The body was not a valid snapshot.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Decode failures versus everything else (transport failures).
    pub fn is_decode(&self) -> bool {
        matches!(self, FetchError::Decode(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

/// Something that can produce a full snapshot on demand.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + Debug {
    /// Fetch and decode one complete snapshot.
    async fn fetch(&self) -> Result<Snapshot, FetchError>;

    /// Where snapshots come from, for logs and the status bar.
    fn endpoint(&self) -> &str;
}

/// Fetches snapshots with `GET <endpoint>`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFetcher {
    /// Create a fetcher for the full endpoint URL (including `/api/state`).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(endpoint, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SnapshotFetcher for HttpFetcher {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(decode_snapshot(&body)?)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
