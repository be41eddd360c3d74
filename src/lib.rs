//! # deploy-watch
//!
//! Detect, from inside a running application, that a newer build has been
//! deployed.
//!
//! ## Overview
//!
//! `deploy-watch` periodically fetches a reference resource (by default the
//! application's own page), fingerprints its content, and compares the result
//! with the fingerprint captured at startup. When they differ the host's
//! callback is invoked so it can prompt the user to reload.
//!
//! - A fast rolling-checksum [`fingerprint`](core::fingerprint)
//! - A polling monitor driven by a single tokio task per activation
//! - Defaults that keep polling off in development and on `localhost`
//! - Settings from files and environment variables via `config`
//! - Swappable callback without restarting the monitor
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deploy_watch::prelude::*;
//! use std::time::Duration;
//!
//! # async fn example() -> deploy_watch::error::Result<()> {
//! let mut monitor = UpdateMonitor::builder()
//!     .with_page_url("https://app.example.com/")
//!     .with_check_interval(Duration::from_secs(15 * 60))
//!     .on_new_version_available(|| {
//!         println!("A new version is available. Reload to update.");
//!     })
//!     .build()?;
//!
//! monitor.start()?;
//!
//! // On shutdown
//! monitor.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-fetch` (default): poll `file://` URLs from local disk
//! - `metrics`: OpenTelemetry metrics for polls, failures, and detections

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod notify;
pub mod sources;

#[cfg(feature = "metrics")]
pub mod metrics;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        HostContext, MonitorOptions, MonitorSettings, RuntimeEnvironment, SettingsLoader,
        UpdateMode, UpdateMonitor, UpdateMonitorBuilder, fingerprint,
    };
    pub use crate::error::{MonitorError, Result, ValidationError};
    pub use crate::sources::ContentFetcher;
}
