//! Polling lifecycle for a single activation.
//!
//! Each activation owns one driver task. The driver issues the baseline fetch,
//! ticks at a fixed period from activation time, and applies fetch results in
//! completion order. Baseline writes and callback invocations only ever happen
//! on the driver task.

use crate::core::{MonitorConfig, Validate, fingerprint};
use crate::error::{MonitorError, Result};
use crate::notify::CallbackSlot;
use crate::sources::ContentFetcher;
use arc_swap::ArcSwapOption;
use reqwest::Url;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use crate::metrics::MonitorMetrics;

/// Start monitoring with a resolved configuration.
///
/// With [`UpdateMode::Disabled`](crate::core::UpdateMode::Disabled) this is a
/// no-op: nothing is fetched, no timer exists, and the callback never runs.
/// Otherwise the baseline fetch is issued immediately and the first poll
/// fires one `check_interval` after activation.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or, for an enabled mode,
/// if called outside a tokio runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::core::{activate, HostContext, MonitorOptions, RuntimeEnvironment};
/// use deploy_watch::notify::CallbackSlot;
/// use deploy_watch::sources::DefaultFetcher;
/// use std::sync::Arc;
///
/// # async fn example() -> deploy_watch::error::Result<()> {
/// let host = HostContext::new(
///     "https://app.example.com/".parse().unwrap(),
///     RuntimeEnvironment::Production,
/// );
/// let config = MonitorOptions::new().resolve(&host)?;
///
/// let handle = activate(
///     config,
///     Arc::new(DefaultFetcher::with_defaults()?),
///     Arc::new(CallbackSlot::new(|| println!("new version deployed"))),
/// )?;
///
/// // ... later
/// handle.deactivate().await;
/// # Ok(())
/// # }
/// ```
pub fn activate(
    config: MonitorConfig,
    fetcher: Arc<dyn ContentFetcher>,
    callback: Arc<CallbackSlot>,
) -> Result<MonitorHandle> {
    activate_with(config, fetcher, callback, Telemetry::default())
}

pub(crate) fn activate_with(
    config: MonitorConfig,
    fetcher: Arc<dyn ContentFetcher>,
    callback: Arc<CallbackSlot>,
    telemetry: Telemetry,
) -> Result<MonitorHandle> {
    config.validate()?;

    let baseline = Arc::new(ArcSwapOption::empty());

    if !config.update_mode.is_enabled() {
        info!(url = %config.url, "Update monitor disabled, not polling");
        return Ok(MonitorHandle {
            config,
            baseline,
            driver: None,
        });
    }

    let runtime = Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
    let first_tick = Instant::now() + config.check_interval;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    info!(
        url = %config.url,
        check_interval = ?config.check_interval,
        update_mode = %config.update_mode,
        fetcher = %fetcher.name(),
        "Update monitor activated"
    );

    let driver = Driver {
        config: config.clone(),
        fetcher,
        callback,
        baseline: Arc::clone(&baseline),
        telemetry,
    };
    let task = runtime.spawn(driver.run(first_tick, shutdown_rx));

    Ok(MonitorHandle {
        config,
        baseline,
        driver: Some(DriverTask {
            shutdown: shutdown_tx,
            task,
        }),
    })
}

struct DriverTask {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Lifecycle handle for one activation.
///
/// Call [`deactivate`](Self::deactivate) to stop polling. Dropping the handle
/// also stops the driver, but without waiting for it.
pub struct MonitorHandle {
    config: MonitorConfig,
    baseline: Arc<ArcSwapOption<String>>,
    driver: Option<DriverTask>,
}

impl MonitorHandle {
    /// The configuration this activation runs with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The baseline fingerprint, once the baseline fetch has succeeded.
    pub fn baseline(&self) -> Option<Arc<String>> {
        self.baseline.load_full()
    }

    /// Whether a driver task is polling for this activation.
    pub fn is_running(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.task.is_finished())
    }

    /// Stop polling and release the timer.
    ///
    /// Waits for the driver to exit, so the callback is never invoked after
    /// this returns. In-flight fetches are aborted and their results dropped.
    pub async fn deactivate(mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        // The driver may already have exited if the receiver side is gone
        let _ = driver.shutdown.send(());

        match driver.task.await {
            Ok(()) => info!(url = %self.config.url, "Update monitor deactivated"),
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(url = %self.config.url, error = %e, "Update monitor driver panicked"),
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.task.abort();
        }
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("config", &self.config)
            .field("baseline", &self.baseline())
            .field("running", &self.is_running())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeKind {
    Baseline,
    Poll,
}

struct ProbeOutcome {
    kind: ProbeKind,
    result: Result<String>,
    elapsed: Duration,
}

async fn probe(fetcher: Arc<dyn ContentFetcher>, url: Url, kind: ProbeKind) -> ProbeOutcome {
    let started = Instant::now();
    let result = fetcher.fetch_text(&url).await.map(|text| fingerprint(&text));
    ProbeOutcome {
        kind,
        result,
        elapsed: started.elapsed(),
    }
}

struct Driver {
    config: MonitorConfig,
    fetcher: Arc<dyn ContentFetcher>,
    callback: Arc<CallbackSlot>,
    baseline: Arc<ArcSwapOption<String>>,
    telemetry: Telemetry,
}

impl Driver {
    async fn run(self, first_tick: Instant, mut shutdown: oneshot::Receiver<()>) {
        let mut ticker = time::interval_at(first_tick, self.config.check_interval);
        // After a stall, poll once and stay on the grid instead of catching up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut inflight = JoinSet::new();

        self.issue(&mut inflight, ProbeKind::Baseline);

        loop {
            tokio::select! {
                biased;

                // Fires on an explicit shutdown and when the handle is dropped
                _ = &mut shutdown => break,

                Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                    self.apply(joined);
                }

                _ = ticker.tick() => self.issue(&mut inflight, ProbeKind::Poll),
            }
        }

        inflight.abort_all();
    }

    fn issue(&self, inflight: &mut JoinSet<ProbeOutcome>, kind: ProbeKind) {
        debug!(url = %self.config.url, ?kind, in_flight = inflight.len(), "Fetching");
        self.telemetry.poll_issued();
        inflight.spawn(probe(
            Arc::clone(&self.fetcher),
            self.config.url.clone(),
            kind,
        ));
    }

    fn apply(&self, joined: std::result::Result<ProbeOutcome, JoinError>) {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "Fetch task failed");
                return;
            }
        };

        let current = match outcome.result {
            Ok(current) => {
                self.telemetry.fetch_succeeded(outcome.elapsed);
                current
            }
            Err(e) => {
                self.telemetry.fetch_failed(outcome.elapsed);
                warn!(
                    url = %self.config.url,
                    kind = ?outcome.kind,
                    error = %e,
                    "Fetch failed, skipping this cycle"
                );
                return;
            }
        };

        match outcome.kind {
            ProbeKind::Baseline => {
                info!(url = %self.config.url, fingerprint = %current, "Baseline established");
                self.baseline.store(Some(Arc::new(current)));
                self.telemetry.baseline_established();
            }
            ProbeKind::Poll => self.compare(&current),
        }
    }

    fn compare(&self, current: &str) {
        let Some(baseline) = self.baseline.load_full() else {
            debug!(
                url = %self.config.url,
                fingerprint = %current,
                "No baseline yet, discarding poll result"
            );
            return;
        };

        if baseline.as_str() == current {
            debug!(url = %self.config.url, fingerprint = %current, "Unchanged");
            return;
        }

        info!(
            url = %self.config.url,
            baseline = %baseline,
            fingerprint = %current,
            "New version detected"
        );
        self.telemetry.new_version_detected();
        self.callback.notify();
    }
}

/// Forwards monitor events to metrics when the `metrics` feature is enabled.
#[derive(Clone, Default)]
pub(crate) struct Telemetry {
    #[cfg(feature = "metrics")]
    metrics: Option<MonitorMetrics>,
}

#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
impl Telemetry {
    #[cfg(feature = "metrics")]
    pub(crate) fn with_metrics(metrics: MonitorMetrics) -> Self {
        Self {
            metrics: Some(metrics),
        }
    }

    fn poll_issued(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_poll();
        }
    }

    fn fetch_succeeded(&self, elapsed: Duration) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch_success(elapsed);
            metrics.update_staleness();
        }
    }

    fn fetch_failed(&self, elapsed: Duration) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch_failure(elapsed);
            metrics.update_staleness();
        }
    }

    fn baseline_established(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_baseline();
        }
    }

    fn new_version_detected(&self) {
        #[cfg(feature = "metrics")]
        if let Some(metrics) = &self.metrics {
            metrics.record_new_version();
        }
    }
}
