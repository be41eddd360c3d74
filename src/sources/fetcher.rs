//! Content fetcher trait.

use super::HttpFetcher;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Url;

#[cfg(feature = "file-fetch")]
use super::FileFetcher;

/// Retrieves the text body of the reference resource.
///
/// Implement this trait to poll something other than plain HTTP, or to script
/// responses in tests.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use deploy_watch::error::Result;
/// use deploy_watch::sources::ContentFetcher;
/// use reqwest::Url;
///
/// struct Fixed(&'static str);
///
/// #[async_trait]
/// impl ContentFetcher for Fixed {
///     async fn fetch_text(&self, _url: &Url) -> Result<String> {
///         Ok(self.0.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return its body decoded as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be retrieved or decoded.
    async fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Get a human-readable name for this fetcher (for logging/debugging).
    fn name(&self) -> String {
        "custom".to_string()
    }
}

/// Fetcher that picks a transport from the URL scheme.
///
/// `file://` URLs are read from disk when the `file-fetch` feature is
/// enabled; everything else goes over HTTP.
pub struct DefaultFetcher {
    http: HttpFetcher,
    #[cfg(feature = "file-fetch")]
    file: FileFetcher,
}

impl DefaultFetcher {
    /// Create a default fetcher around an HTTP fetcher.
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            #[cfg(feature = "file-fetch")]
            file: FileFetcher::new(),
        }
    }

    /// Create a default fetcher with default HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(HttpFetcher::builder().build()?))
    }
}

#[async_trait]
impl ContentFetcher for DefaultFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        #[cfg(feature = "file-fetch")]
        if url.scheme() == "file" {
            return self.file.fetch_text(url).await;
        }

        self.http.fetch_text(url).await
    }

    fn name(&self) -> String {
        "default".to_string()
    }
}
