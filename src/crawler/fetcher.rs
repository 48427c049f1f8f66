//! HTTP fetcher implementation
//!
//! This module handles all document retrieval for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - The [`Fetch`] seam the batch expander is generic over
//! - A blocking client for single-shot lookups during live searches
//!
//! Any non-success status or transport failure becomes a [`FetchError`];
//! there are no retries.

use crate::config::UserAgentConfig;
use crate::reference::Reference;
use crate::FetchError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Upper bound on connection establishment
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrieves the raw bytes of one document
///
/// Implementations must be shareable across tasks; the batch expander
/// holds one behind an `Arc` and calls it from many tasks at once.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(
        &self,
        reference: &Reference,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Async fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from the user agent settings
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, reference: &Reference) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(reference.as_str())
            .send()
            .await
            .map_err(|source| transport_error(reference, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| transport_error(reference, source))?;
        Ok(body.to_vec())
    }
}

/// Blocking fetcher for one-document-at-a-time lookups
///
/// Must not be used from inside an async context; run it on a blocking
/// thread (`tokio::task::spawn_blocking`) when a runtime is active.
#[derive(Debug, Clone)]
pub struct BlockingFetcher {
    client: reqwest::blocking::Client,
}

impl BlockingFetcher {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_blocking_client(config, timeout)?))
    }

    pub fn fetch(&self, reference: &Reference) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(reference.as_str())
            .send()
            .map_err(|source| transport_error(reference, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                reference: reference.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|source| transport_error(reference, source))?;
        Ok(body.to_vec())
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Deadline for a whole request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use wiki_sprawl::config::UserAgentConfig;
/// use wiki_sprawl::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "WikiSprawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Blocking counterpart of [`build_http_client`]
pub fn build_blocking_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

fn transport_error(reference: &Reference, source: reqwest::Error) -> FetchError {
    FetchError::Transport {
        reference: reference.to_string(),
        source,
    }
}
