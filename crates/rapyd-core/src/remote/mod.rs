//! Client side of the remote file service.
//!
//! [`listing::ListingService`] lists directories, [`content::ContentClient`]
//! fetches preview bytes and downloads, and [`endpoints::ApiEndpoints`]
//! builds the URLs both of them use.

pub mod content;
pub mod endpoints;
pub mod listing;

#[cfg(test)]
pub(crate) mod test_server;

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// Builds the shared HTTP client.
///
/// Only the connect phase is bounded here; per-request timeouts are applied
/// by the listing and content clients where they make sense.
pub fn http_client(connect_timeout: Duration) -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(concat!("rapyd/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| CoreError::Transport(format!("failed to build http client: {e}")))
}
