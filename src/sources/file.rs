//! Local file content fetcher.

use super::ContentFetcher;
use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::Url;

/// Reads `file://` URLs from local disk.
///
/// Useful for applications whose entry document is served straight from the
/// filesystem, where a new deployment replaces the file in place.
///
/// # Examples
///
/// ```rust
/// use deploy_watch::sources::FileFetcher;
///
/// let fetcher = FileFetcher::new();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    /// Create a new file fetcher.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentFetcher for FileFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        if url.scheme() != "file" {
            return Err(MonitorError::FetchError(format!(
                "FileFetcher only supports file:// URLs, got {}",
                url
            )));
        }

        let path = url.to_file_path().map_err(|_| {
            MonitorError::FetchError(format!("Not a local file path: {}", url))
        })?;

        Ok(tokio::fs::read_to_string(&path).await?)
    }

    fn name(&self) -> String {
        "file".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file_url() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("index.html");
        fs::write(&path, "<html>build 1</html>").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let text = FileFetcher::new().fetch_text(&url).await.unwrap();
        assert_eq!(text, "<html>build 1</html>");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let url = Url::from_file_path(temp_dir.path().join("missing.html")).unwrap();

        let result = FileFetcher::new().fetch_text(&url).await;
        assert!(matches!(result, Err(MonitorError::IoError(_))));
    }

    #[tokio::test]
    async fn test_rejects_http_url() {
        let url: Url = "https://app.example.com/".parse().unwrap();
        let result = FileFetcher::new().fetch_text(&url).await;
        assert!(matches!(result, Err(MonitorError::FetchError(_))));
    }
}
