//! Audio resource retrieval
//!
//! Line sources resolve either to an `http(s)://` URL or to a local path,
//! depending on the configured audio base.

use crate::error::{Error, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("convo-player/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw bytes of one audio resource
pub trait AudioFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// HTTP(S) fetcher
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    /// `timeout` bounds each whole request
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

impl AudioFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %url, "Fetching audio");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await.map_err(|e| Error::fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Local file fetcher; accepts plain paths and `file://` URLs
#[derive(Debug, Default, Clone, Copy)]
pub struct FileFetcher;

impl AudioFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        debug!(path = %path.display(), "Reading audio");

        tokio::fs::read(path).await.map_err(|e| Error::fetch(url, e))
    }
}

/// Dispatches `http://` and `https://` sources to HTTP, everything else to disk
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(timeout)?,
            file: FileFetcher,
        })
    }
}

impl AudioFetcher for SourceFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if is_remote(url) {
            self.http.fetch(url).await
        } else {
            self.file.fetch(url).await
        }
    }
}

/// Whether a source must be fetched over HTTP
pub fn is_remote(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/audioFiles/a.mp3"));
        assert!(is_remote("HTTP://example.com/a.mp3"));
        assert!(!is_remote("public/audioFiles/a.mp3"));
        assert!(!is_remote("/audioFiles/a.mp3"));
        assert!(!is_remote("file:///tmp/a.mp3"));
    }

    #[tokio::test]
    async fn test_file_fetcher_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("line.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let url = path.to_string_lossy().to_string();
        assert_eq!(FileFetcher.fetch(&url).await.unwrap(), vec![1, 2, 3]);

        let file_url = format!("file://{}", url);
        assert_eq!(FileFetcher.fetch(&file_url).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_file_fetcher_missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("nope.mp3").to_string_lossy().to_string();

        let err = FileFetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
