//! HTTP/HTTPS content fetcher.

use super::ContentFetcher;
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderValue, PRAGMA};
use reqwest::{Client, Url};
use std::time::Duration;

/// Fetches the reference resource over HTTP(S).
///
/// Non-success statuses are reported as errors, never as content.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::sources::HttpFetcher;
/// use std::time::Duration;
///
/// # fn example() -> deploy_watch::error::Result<()> {
/// let fetcher = HttpFetcher::builder()
///     .with_timeout(Duration::from_secs(5))
///     .with_user_agent("my-app/1.0")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    bypass_cache: bool,
}

impl HttpFetcher {
    /// Create a new builder for constructing an HTTP fetcher.
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        let mut request = self.client.get(url.clone());

        if self.bypass_cache {
            request = request
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MonitorError::FetchError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MonitorError::FetchError(format!("Failed to read body: {}", e)))
    }

    fn name(&self) -> String {
        "http".to_string()
    }
}

/// Builder for constructing an `HttpFetcher`.
pub struct HttpFetcherBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    bypass_cache: bool,
}

impl HttpFetcherBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: None,
            bypass_cache: true,
        }
    }

    /// Set the request timeout.
    ///
    /// Default is 10 seconds.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `User-Agent` sent with every poll.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Ask intermediaries not to serve a cached copy.
    ///
    /// Default is `true`. A stale cache would hide a new deployment.
    pub fn with_cache_bypass(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    /// Build the HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpFetcher> {
        let mut builder = Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| MonitorError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpFetcher {
            client,
            bypass_cache: self.bypass_cache,
        })
    }
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
