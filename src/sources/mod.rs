//! Content fetchers for the reference resource.

mod fetcher;
mod http;

#[cfg(feature = "file-fetch")]
mod file;

pub use fetcher::{ContentFetcher, DefaultFetcher};
pub use http::{HttpFetcher, HttpFetcherBuilder};

#[cfg(feature = "file-fetch")]
pub use file::FileFetcher;
