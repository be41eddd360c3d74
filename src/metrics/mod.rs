//! Built-in metrics for update monitoring.
//!
//! Provides OpenTelemetry metrics tracking:
//! - Poll attempts and fetch failures
//! - Fetch duration
//! - Baselines established
//! - New versions detected
//! - Time since the last successful fetch
//!
//! # Examples
//!
//! ```rust,no_run
//! use deploy_watch::prelude::*;
//! use opentelemetry::global;
//!
//! # fn example() -> Result<()> {
//! let meter = global::meter("my-app");
//!
//! let monitor = UpdateMonitor::builder()
//!     .with_page_url("https://app.example.com/")
//!     .with_metrics(meter)
//!     .on_new_version_available(|| println!("new version deployed"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod monitor_metrics;

pub use monitor_metrics::MonitorMetrics;
