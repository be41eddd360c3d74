//! The long-lived update monitor owned by the host application.

use crate::core::monitor::{Telemetry, activate_with};
use crate::core::{HostContext, MonitorConfig, MonitorHandle, MonitorOptions, UpdateMonitorBuilder};
use crate::error::Result;
use crate::notify::CallbackSlot;
use crate::sources::ContentFetcher;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Watches for new deployments of the host application.
///
/// Owns at most one activation at a time. Options can be changed while the
/// monitor runs; a change to the URL, interval, or mode restarts polling with
/// a fresh baseline, while the callback can be swapped at any time.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<()> {
/// let mut monitor = UpdateMonitor::builder()
///     .with_page_url("https://app.example.com/")
///     .with_check_interval(Duration::from_secs(600))
///     .on_new_version_available(|| println!("A new version is available, please reload"))
///     .build()?;
///
/// monitor.start()?;
///
/// // Poll a dedicated version file instead
/// monitor
///     .reconfigure(MonitorOptions::new().with_url("https://app.example.com/version.txt"))
///     .await?;
///
/// monitor.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct UpdateMonitor {
    host: HostContext,
    options: MonitorOptions,
    fetcher: Arc<dyn ContentFetcher>,
    callback: Arc<CallbackSlot>,
    telemetry: Telemetry,
    active: Option<MonitorHandle>,
}

impl UpdateMonitor {
    /// Create a new builder for constructing an update monitor.
    pub fn builder() -> UpdateMonitorBuilder {
        UpdateMonitorBuilder::new()
    }

    pub(crate) fn from_parts(
        host: HostContext,
        options: MonitorOptions,
        fetcher: Arc<dyn ContentFetcher>,
        callback: Arc<CallbackSlot>,
        telemetry: Telemetry,
    ) -> Self {
        Self {
            host,
            options,
            fetcher,
            callback,
            telemetry,
            active: None,
        }
    }

    /// Resolve the current options and activate.
    ///
    /// Does nothing if a live activation already exists. An activation whose
    /// driver has exited, for example after a callback panic, is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the options do not resolve to a valid
    /// configuration, or if polling is enabled outside a tokio runtime.
    pub fn start(&mut self) -> Result<&MonitorConfig> {
        let handle = match self.take_live() {
            Some(handle) => handle,
            None => {
                let config = self.options.resolve(&self.host)?;
                self.activate(config)?
            }
        };

        Ok(self.active.insert(handle).config())
    }

    /// Deactivate, discarding the baseline.
    ///
    /// No callback runs after this returns.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.deactivate().await;
        }
    }

    /// Replace the options.
    ///
    /// If the monitor is active and the URL, interval, or mode resolves
    /// differently, the current activation is torn down and a fresh one
    /// started. An activation whose driver has exited is restarted even when
    /// the configuration is unchanged. Returns whether a restart happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the new options do not resolve. The running
    /// activation and the previous options are left untouched in that case.
    pub async fn reconfigure(&mut self, options: MonitorOptions) -> Result<bool> {
        let config = options.resolve(&self.host)?;
        self.options = options;

        let Some(previous) = self.active.take() else {
            return Ok(false);
        };

        if previous.config() == &config && !is_dead(&previous) {
            debug!(url = %config.url, "Configuration unchanged, keeping activation");
            self.active = Some(previous);
            return Ok(false);
        }

        info!(
            from = %previous.config().url,
            to = %config.url,
            "Configuration changed, restarting update monitor"
        );
        previous.deactivate().await;
        self.active = Some(self.activate(config)?);
        Ok(true)
    }

    /// Replace the new-version callback without restarting.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback.replace(callback);
    }

    /// The configuration of the current activation, if any.
    pub fn config(&self) -> Option<&MonitorConfig> {
        self.active.as_ref().map(MonitorHandle::config)
    }

    /// The options the next activation resolves from.
    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// The host context options are resolved against.
    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// The baseline fingerprint of the current activation.
    pub fn baseline(&self) -> Option<Arc<String>> {
        self.active.as_ref().and_then(MonitorHandle::baseline)
    }

    /// Whether the monitor is currently polling.
    pub fn is_running(&self) -> bool {
        self.active.as_ref().is_some_and(MonitorHandle::is_running)
    }

    fn take_live(&mut self) -> Option<MonitorHandle> {
        let handle = self.active.take()?;
        if is_dead(&handle) {
            warn!(url = %handle.config().url, "Update monitor driver exited, replacing activation");
            return None;
        }
        Some(handle)
    }

    fn activate(&self, config: MonitorConfig) -> Result<MonitorHandle> {
        activate_with(
            config,
            Arc::clone(&self.fetcher),
            Arc::clone(&self.callback),
            self.telemetry.clone(),
        )
    }
}

/// An enabled activation whose driver is no longer polling.
fn is_dead(handle: &MonitorHandle) -> bool {
    handle.config().update_mode.is_enabled() && !handle.is_running()
}
