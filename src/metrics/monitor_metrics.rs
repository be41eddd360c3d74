//! Update monitor metrics using OpenTelemetry.

use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for update monitor polls.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::metrics::MonitorMetrics;
/// use opentelemetry::global;
/// use std::time::Duration;
///
/// let metrics = MonitorMetrics::new(global::meter("deploy-watch"));
///
/// metrics.record_poll();
/// metrics.record_fetch_success(Duration::from_millis(42));
/// ```
#[derive(Clone)]
pub struct MonitorMetrics {
    polls: Counter<u64>,
    fetch_failures: Counter<u64>,
    fetch_duration: Histogram<f64>,
    baselines: Counter<u64>,
    new_versions: Counter<u64>,
    staleness_seconds: Gauge<i64>,
    last_success: Arc<parking_lot::Mutex<Option<Instant>>>,
}

impl MonitorMetrics {
    /// Create a new metrics collector with the provided meter.
    pub fn new(meter: Meter) -> Self {
        let polls = meter
            .u64_counter("deploy_watch.polls")
            .with_description("Number of fetches issued, including the baseline fetch")
            .build();

        let fetch_failures = meter
            .u64_counter("deploy_watch.fetch.failures")
            .with_description("Number of fetches that failed")
            .build();

        let fetch_duration = meter
            .f64_histogram("deploy_watch.fetch.duration")
            .with_description("Duration of fetch and fingerprint in seconds")
            .with_unit("s")
            .build();

        let baselines = meter
            .u64_counter("deploy_watch.baselines")
            .with_description("Number of baselines established")
            .build();

        let new_versions = meter
            .u64_counter("deploy_watch.new_versions")
            .with_description("Number of polls that detected a new version")
            .build();

        let staleness_seconds = meter
            .i64_gauge("deploy_watch.staleness")
            .with_description("Time since the last successful fetch in seconds")
            .with_unit("s")
            .build();

        Self {
            polls,
            fetch_failures,
            fetch_duration,
            baselines,
            new_versions,
            staleness_seconds,
            last_success: Arc::new(parking_lot::Mutex::new(None)),
        }
    }

    /// Record that a fetch was issued.
    pub fn record_poll(&self) {
        self.polls.add(1, &[]);
    }

    /// Record a successful fetch that took `elapsed`.
    pub fn record_fetch_success(&self, elapsed: Duration) {
        self.fetch_duration.record(elapsed.as_secs_f64(), &[]);
        *self.last_success.lock() = Some(Instant::now());
    }

    /// Record a failed fetch that took `elapsed`.
    pub fn record_fetch_failure(&self, elapsed: Duration) {
        self.fetch_failures.add(1, &[]);
        self.fetch_duration.record(elapsed.as_secs_f64(), &[]);
    }

    /// Record that a baseline fingerprint was stored.
    pub fn record_baseline(&self) {
        self.baselines.add(1, &[]);
    }

    /// Record that a poll saw a fingerprint different from the baseline.
    pub fn record_new_version(&self) {
        self.new_versions.add(1, &[]);
    }

    /// Update the staleness gauge.
    ///
    /// Does nothing until the first successful fetch.
    pub fn update_staleness(&self) {
        if let Some(last) = *self.last_success.lock() {
            self.staleness_seconds
                .record(last.elapsed().as_secs() as i64, &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::global;

    #[test]
    fn test_metrics_creation() {
        let metrics = MonitorMetrics::new(global::meter("test"));

        metrics.update_staleness();
        metrics.record_poll();
        metrics.record_fetch_success(Duration::from_millis(5));
        metrics.record_poll();
        metrics.record_fetch_failure(Duration::from_millis(7));
        metrics.record_baseline();
        metrics.record_new_version();
        metrics.update_staleness();

        assert!(metrics.last_success.lock().is_some());
    }

    #[test]
    fn test_metrics_clone_shares_state() {
        let metrics = MonitorMetrics::new(global::meter("test"));
        let metrics2 = metrics.clone();

        metrics2.record_fetch_success(Duration::from_millis(1));
        assert!(metrics.last_success.lock().is_some());
    }
}
