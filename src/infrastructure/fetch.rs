//! Source fetching for the load pipeline
//!
//! A `DataFetcher` turns a location string into bytes. Two implementations:
//! plain HTTP GET of static files, and the local filesystem. The autoload
//! policy decides which failures matter; fetchers just report them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait DataFetcher: Send + Sync {
    /// Fetch the resource at `location` (relative to the fetcher's root).
    async fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

/// HTTP GET of static data files.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        debug!(%location, "GET data file");
        let response = self
            .client
            .get(location)
            .send()
            .await
            .with_context(|| format!("Request failed: {location}"))?
            .error_for_status()
            .with_context(|| format!("Non-success status: {location}"))?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Body read failed: {location}"))?;
        Ok(bytes.to_vec())
    }
}

/// Reads data files from a directory root.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.root.join(location);
        debug!(path = %path.display(), "read data file");
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_fetcher_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("data"))
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("data/filter.csv"), b"Field,Value\n")
            .await
            .unwrap();

        let fetcher = FileFetcher::new(dir.path());
        let bytes = fetcher.fetch("data/filter.csv").await.unwrap();
        assert_eq!(bytes, b"Field,Value\n");

        assert!(fetcher.fetch("data/missing.csv").await.is_err());
    }
}
