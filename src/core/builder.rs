//! Builder for constructing UpdateMonitor instances.

use crate::core::monitor::Telemetry;
use crate::core::{
    HostContext, MonitorOptions, MonitorSettings, RuntimeEnvironment, UpdateMode, UpdateMonitor,
};
use crate::error::{MonitorError, Result};
use crate::notify::CallbackSlot;
use crate::sources::{ContentFetcher, DefaultFetcher};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use crate::metrics::MonitorMetrics;

/// Builder for constructing an `UpdateMonitor`.
///
/// Options given directly override options merged in earlier through
/// [`with_options`](Self::with_options) or [`with_settings`](Self::with_settings),
/// and vice versa: the last call wins.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::prelude::*;
/// use std::time::Duration;
///
/// # fn example() -> Result<()> {
/// let settings = SettingsLoader::new()
///     .with_optional_file("deploy-watch.toml")
///     .with_env_overrides("DEPLOY_WATCH")
///     .load()?;
///
/// let monitor = UpdateMonitor::builder()
///     .with_page_url("https://app.example.com/")
///     .with_settings(&settings)
///     .with_check_interval(Duration::from_secs(300))
///     .on_new_version_available(|| println!("reload to update"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct UpdateMonitorBuilder {
    options: MonitorOptions,
    page_url: Option<String>,
    environment: Option<RuntimeEnvironment>,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    callback: Option<CallbackSlot>,
    #[cfg(feature = "metrics")]
    metrics: Option<MonitorMetrics>,
}

impl UpdateMonitorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            options: MonitorOptions::new(),
            page_url: None,
            environment: None,
            fetcher: None,
            callback: None,
            #[cfg(feature = "metrics")]
            metrics: None,
        }
    }

    /// Merge a set of options over what has been configured so far.
    pub fn with_options(mut self, options: MonitorOptions) -> Self {
        self.options = self.options.merge(options);
        self
    }

    /// Merge loaded settings, including any environment override.
    pub fn with_settings(mut self, settings: &MonitorSettings) -> Self {
        self.options = self.options.merge(settings.to_options());
        if let Some(environment) = settings.environment {
            self.environment = Some(environment);
        }
        self
    }

    /// Poll this URL instead of the page URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.options = self.options.with_url(url);
        self
    }

    /// Set the time between polls.
    ///
    /// Default is one hour.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.options = self.options.with_check_interval(interval);
        self
    }

    /// Set the update mode explicitly.
    ///
    /// Default depends on the environment and the page host.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.options = self.options.with_update_mode(mode);
        self
    }

    /// Set the address the host application is served from.
    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = Some(page_url.into());
        self
    }

    /// Set the runtime environment instead of detecting it.
    pub fn with_environment(mut self, environment: RuntimeEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Use a custom content fetcher.
    pub fn with_fetcher<F: ContentFetcher + 'static>(mut self, fetcher: F) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Use a content fetcher shared with other code.
    pub fn with_shared_fetcher(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the callback invoked when a new version is detected.
    ///
    /// Required.
    pub fn on_new_version_available<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback = Some(CallbackSlot::new(callback));
        self
    }

    /// Record poll metrics with the provided meter.
    #[cfg(feature = "metrics")]
    pub fn with_metrics(mut self, meter: opentelemetry::metrics::Meter) -> Self {
        self.metrics = Some(MonitorMetrics::new(meter));
        self
    }

    /// Build the monitor without starting it.
    ///
    /// The options are resolved once here so configuration mistakes surface
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No callback was set
    /// - The page URL or poll URL cannot be parsed
    /// - There is neither a poll URL nor a page URL
    /// - The check interval is zero
    /// - The default HTTP client cannot be constructed
    pub fn build(self) -> Result<UpdateMonitor> {
        let callback = self.callback.ok_or(MonitorError::MissingCallback)?;

        let page_url = self
            .page_url
            .map(|raw| {
                Url::parse(&raw).map_err(|e| MonitorError::InvalidUrl {
                    url: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let host = HostContext {
            page_url,
            environment: self.environment.unwrap_or_else(RuntimeEnvironment::detect),
        };

        self.options.resolve(&host)?;

        let fetcher: Arc<dyn ContentFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(DefaultFetcher::with_defaults()?),
        };

        #[cfg(feature = "metrics")]
        let telemetry = self
            .metrics
            .map(Telemetry::with_metrics)
            .unwrap_or_default();
        #[cfg(not(feature = "metrics"))]
        let telemetry = Telemetry::default();

        Ok(UpdateMonitor::from_parts(
            host,
            self.options,
            fetcher,
            Arc::new(callback),
            telemetry,
        ))
    }

    /// Build the monitor and start it.
    ///
    /// # Errors
    ///
    /// Returns an error if building fails or if polling is enabled outside a
    /// tokio runtime.
    pub fn start(self) -> Result<UpdateMonitor> {
        let mut monitor = self.build()?;
        monitor.start()?;
        Ok(monitor)
    }
}

impl Default for UpdateMonitorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_options() {
        let builder = UpdateMonitorBuilder::new()
            .with_url("https://a.example.com/")
            .with_options(MonitorOptions::new().with_check_interval(Duration::from_secs(5)))
            .with_update_mode(UpdateMode::Manual);

        assert_eq!(
            builder.options,
            MonitorOptions::new()
                .with_url("https://a.example.com/")
                .with_check_interval(Duration::from_secs(5))
                .with_update_mode(UpdateMode::Manual)
        );
    }

    #[test]
    fn test_build_requires_callback() {
        let result = UpdateMonitorBuilder::new()
            .with_page_url("https://app.example.com/")
            .build();
        assert!(matches!(result, Err(MonitorError::MissingCallback)));
    }

    #[test]
    fn test_build_rejects_bad_page_url() {
        let result = UpdateMonitorBuilder::new()
            .with_page_url("::nope::")
            .on_new_version_available(|| {})
            .build();
        assert!(matches!(result, Err(MonitorError::InvalidUrl { .. })));
    }

    #[test]
    fn test_build_requires_some_url() {
        let result = UpdateMonitorBuilder::new()
            .with_environment(RuntimeEnvironment::Production)
            .on_new_version_available(|| {})
            .build();
        assert!(matches!(result, Err(MonitorError::MissingUrl)));
    }

    #[test]
    fn test_settings_environment_applies() {
        let settings = MonitorSettings {
            url: None,
            check_interval_ms: Some(1000),
            update_mode: None,
            environment: Some(RuntimeEnvironment::Production),
        };

        let monitor = UpdateMonitorBuilder::new()
            .with_page_url("https://app.example.com/")
            .with_settings(&settings)
            .on_new_version_available(|| {})
            .build()
            .unwrap();

        assert_eq!(monitor.host().environment, RuntimeEnvironment::Production);
        assert_eq!(
            monitor.options(),
            &MonitorOptions::new().with_check_interval(Duration::from_millis(1000))
        );
    }

    #[test]
    fn test_interval_set_after_settings_wins() {
        let settings = MonitorSettings {
            url: None,
            check_interval_ms: Some(1000),
            update_mode: None,
            environment: None,
        };

        let builder = UpdateMonitorBuilder::new()
            .with_settings(&settings)
            .with_check_interval(Duration::from_secs(30));

        assert_eq!(
            builder.options,
            MonitorOptions::new().with_check_interval(Duration::from_secs(30))
        );
    }
}
