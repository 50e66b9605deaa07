//! Raw file retrieval from URLs and local paths

use crate::domain::{Result, SeedError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Retrieves the bytes of an upstream file
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches `location`, an `http(s)://` URL or a local path
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// Fetches URLs over HTTP(S) and everything else from the filesystem
pub struct SourceFetcher {
    client: Client,
}

impl SourceFetcher {
    /// # Errors
    ///
    /// Returns [`SeedError::Configuration`] if the HTTP client cannot be built
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SeedError::Configuration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SeedError::Source(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeedError::Source(format!("GET {url} returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SeedError::Source(format!("reading {url} failed: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// Whether a location is fetched over the network
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[async_trait]
impl DatasetSource for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let bytes = if is_remote(location) {
            self.fetch_url(location).await?
        } else {
            tokio::fs::read(location)
                .await
                .map_err(|e| SeedError::Source(format!("reading {location} failed: {e}")))?
        };

        tracing::debug!(location = %location, bytes = bytes.len(), "Fetched source");
        Ok(bytes)
    }
}
