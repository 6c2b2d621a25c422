//! Directory listing service.
//!
//! [`ListingService`] is the seam between the navigation state machine and
//! the network. [`HttpListingClient`] is the production implementation over
//! `GET /api/files`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::fs::entry::FileEntry;
use crate::remote::endpoints::ApiEndpoints;

/// Lists the direct children of a directory.
///
/// Implementations are stateless and re-entrant; keeping a single request
/// outstanding is the caller's job. An empty `path` lists the root. No
/// ordering of the returned entries is guaranteed.
#[async_trait]
pub trait ListingService: Send + Sync {
    async fn list(&self, path: &str) -> CoreResult<Vec<FileEntry>>;
}

/// Listing client for the HTTP file service.
#[derive(Debug, Clone)]
pub struct HttpListingClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    timeout: Duration,
}

impl HttpListingClient {
    pub fn new(http: reqwest::Client, endpoints: ApiEndpoints, timeout: Duration) -> Self {
        Self {
            http,
            endpoints,
            timeout,
        }
    }
}

#[async_trait]
impl ListingService for HttpListingClient {
    /// Fetches one listing. Fails on transport errors, non-success status,
    /// or a body that is not a JSON array of entries. Never retries.
    async fn list(&self, path: &str) -> CoreResult<Vec<FileEntry>> {
        let url = self.endpoints.files(path);
        tracing::debug!(%url, "requesting listing");

        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::ListStatus {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CoreError::Transport(e.to_string()))?;

        let entries: Vec<FileEntry> = serde_json::from_slice(&body)
            .map_err(|e| CoreError::MalformedPayload(e.to_string()))?;

        tracing::debug!(path, count = entries.len(), "listing received");
        Ok(entries)
    }
}
