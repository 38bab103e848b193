//! Document fetching for the synchronizer

use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of published documents, addressed by path relative to the site base
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw body of the document at `path`
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SyncError>;

    /// Full location of `path`, used in log lines and errors
    fn location(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Plain HTTP fetcher
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network {
                url: base_url.to_string(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn map_http_error(&self, url: &str, error: reqwest::Error) -> SyncError {
        if error.is_timeout() {
            SyncError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            SyncError::Network {
                url: url.to_string(),
                message: format!("Connection failed: {}", error),
            }
        } else {
            SyncError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, SyncError> {
        let url = self.location(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_http_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_http_error(&url, e))?;
        Ok(body.to_vec())
    }

    fn location(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
