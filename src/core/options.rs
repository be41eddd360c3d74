//! Monitor options, defaults, and resolution into an activation config.

use crate::core::Validate;
use crate::error::{MonitorError, Result, ValidationError};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Default time between polls: one hour.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(3_600_000);

/// Environment variable consulted by [`RuntimeEnvironment::detect`].
pub const ENVIRONMENT_VAR: &str = "DEPLOY_WATCH_ENV";

/// How the host intends to react to a detected deployment.
///
/// `Manual` and `Immediate` poll identically; the difference only matters to
/// the host's own callback handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Never fetch, never notify.
    Disabled,
    /// The host reloads as soon as it is notified.
    Immediate,
    /// The host asks the user before reloading.
    Manual,
}

impl UpdateMode {
    /// Whether this mode polls at all.
    pub fn is_enabled(self) -> bool {
        self != UpdateMode::Disabled
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateMode::Disabled => "disabled",
            UpdateMode::Immediate => "immediate",
            UpdateMode::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl FromStr for UpdateMode {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(UpdateMode::Disabled),
            "immediate" => Ok(UpdateMode::Immediate),
            "manual" => Ok(UpdateMode::Manual),
            other => Err(ValidationError::invalid_field(
                "update_mode",
                format!("unknown mode '{}', expected disabled, immediate or manual", other),
            )
            .into()),
        }
    }
}

/// The kind of environment the host application runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// A deployed production build.
    Production,
    /// A local development build.
    Development,
    /// A test run.
    Test,
}

impl RuntimeEnvironment {
    /// Detect the environment from `DEPLOY_WATCH_ENV`.
    ///
    /// Falls back to `Development` in debug builds and `Production` otherwise
    /// when the variable is unset or unrecognised.
    pub fn detect() -> Self {
        std::env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_else(Self::build_default)
    }

    fn build_default() -> Self {
        if cfg!(debug_assertions) {
            RuntimeEnvironment::Development
        } else {
            RuntimeEnvironment::Production
        }
    }
}

impl FromStr for RuntimeEnvironment {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(RuntimeEnvironment::Production),
            "development" | "dev" => Ok(RuntimeEnvironment::Development),
            "test" => Ok(RuntimeEnvironment::Test),
            other => Err(ValidationError::invalid_field(
                "environment",
                format!("unknown environment '{}'", other),
            )
            .into()),
        }
    }
}

/// What the monitor knows about the application hosting it.
#[derive(Debug, Clone, PartialEq)]
pub struct HostContext {
    /// The address the application itself is served from.
    pub page_url: Option<Url>,
    /// The runtime environment of the host.
    pub environment: RuntimeEnvironment,
}

impl HostContext {
    /// Create a host context for a page served from `page_url`.
    pub fn new(page_url: Url, environment: RuntimeEnvironment) -> Self {
        Self {
            page_url: Some(page_url),
            environment,
        }
    }

    /// Detect the runtime environment with no page URL set.
    pub fn detect() -> Self {
        Self {
            page_url: None,
            environment: RuntimeEnvironment::detect(),
        }
    }

    fn is_served_locally(&self) -> bool {
        self.page_url.as_ref().is_some_and(is_loopback)
    }

    /// The update mode used when the caller does not pick one.
    ///
    /// Polling stays off outside production and on loopback hosts.
    pub fn default_update_mode(&self) -> UpdateMode {
        if self.environment != RuntimeEnvironment::Production || self.is_served_locally() {
            UpdateMode::Disabled
        } else {
            UpdateMode::Manual
        }
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::detect()
    }
}

/// Caller-supplied monitor options. Unset fields take their defaults on resolve.
///
/// # Examples
///
/// ```rust
/// use deploy_watch::core::{HostContext, MonitorOptions, RuntimeEnvironment, UpdateMode};
/// use std::time::Duration;
///
/// let host = HostContext::new(
///     "https://app.example.com/".parse().unwrap(),
///     RuntimeEnvironment::Production,
/// );
///
/// let config = MonitorOptions::new()
///     .with_check_interval(Duration::from_secs(300))
///     .resolve(&host)
///     .unwrap();
///
/// assert_eq!(config.url.as_str(), "https://app.example.com/");
/// assert_eq!(config.update_mode, UpdateMode::Manual);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorOptions {
    url: Option<String>,
    check_interval: Option<Duration>,
    update_mode: Option<UpdateMode>,
}

impl MonitorOptions {
    /// Create options with every field left to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll this URL instead of the page URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the time between polls.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = Some(interval);
        self
    }

    /// Set the update mode explicitly.
    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = Some(mode);
        self
    }

    /// Overlay every field set in `other` on top of these options.
    pub fn merge(mut self, other: MonitorOptions) -> Self {
        if other.url.is_some() {
            self.url = other.url;
        }
        if other.check_interval.is_some() {
            self.check_interval = other.check_interval;
        }
        if other.update_mode.is_some() {
            self.update_mode = other.update_mode;
        }
        self
    }

    /// Resolve these options against the host into an activation config.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No URL is set and the host has no page URL
    /// - The URL cannot be parsed
    /// - The check interval is zero
    pub fn resolve(&self, host: &HostContext) -> Result<MonitorConfig> {
        let url = match &self.url {
            Some(raw) => parse_url(raw)?,
            None => host.page_url.clone().ok_or(MonitorError::MissingUrl)?,
        };

        let config = MonitorConfig {
            url,
            check_interval: self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL),
            update_mode: self
                .update_mode
                .unwrap_or_else(|| host.default_update_mode()),
        };

        config.validate()?;
        Ok(config)
    }
}

/// A fully resolved configuration, fixed for the lifetime of one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// The resource to poll.
    pub url: Url,
    /// Time between polls.
    pub check_interval: Duration,
    /// The update mode in effect.
    pub update_mode: UpdateMode,
}

impl Validate for MonitorConfig {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.check_interval.is_zero() {
            return Err(ValidationError::invalid_field(
                "check_interval",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| MonitorError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn is_loopback(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };

    // IPv6 hosts keep their brackets in host_str
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(addr) => addr.is_loopback(),
        Err(_) => bare.eq_ignore_ascii_case("localhost") || bare.ends_with(".localhost"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production(page: &str) -> HostContext {
        HostContext::new(page.parse().unwrap(), RuntimeEnvironment::Production)
    }

    #[test]
    fn test_defaults_from_host() {
        let config = MonitorOptions::new()
            .resolve(&production("https://app.example.com/index.html"))
            .unwrap();

        assert_eq!(config.url.as_str(), "https://app.example.com/index.html");
        assert_eq!(config.check_interval, Duration::from_millis(3_600_000));
        assert_eq!(config.update_mode, UpdateMode::Manual);
    }

    #[test]
    fn test_disabled_outside_production() {
        let host = HostContext::new(
            "https://app.example.com/".parse().unwrap(),
            RuntimeEnvironment::Development,
        );
        assert_eq!(host.default_update_mode(), UpdateMode::Disabled);

        let host = HostContext::new(
            "https://app.example.com/".parse().unwrap(),
            RuntimeEnvironment::Test,
        );
        assert_eq!(host.default_update_mode(), UpdateMode::Disabled);
    }

    #[test]
    fn test_disabled_on_loopback_hosts() {
        for page in [
            "http://localhost:3000/",
            "http://LOCALHOST/",
            "http://app.localhost/",
            "http://127.0.0.1:8080/",
            "http://[::1]/",
        ] {
            assert_eq!(
                production(page).default_update_mode(),
                UpdateMode::Disabled,
                "page: {page}"
            );
        }
    }

    #[test]
    fn test_explicit_mode_wins() {
        let host = HostContext::new(
            "http://localhost/".parse().unwrap(),
            RuntimeEnvironment::Development,
        );
        let config = MonitorOptions::new()
            .with_update_mode(UpdateMode::Immediate)
            .resolve(&host)
            .unwrap();
        assert_eq!(config.update_mode, UpdateMode::Immediate);
    }

    #[test]
    fn test_explicit_url_overrides_page() {
        let config = MonitorOptions::new()
            .with_url("https://cdn.example.com/version.txt")
            .resolve(&production("https://app.example.com/"))
            .unwrap();
        assert_eq!(config.url.as_str(), "https://cdn.example.com/version.txt");
    }

    #[test]
    fn test_missing_url() {
        let host = HostContext {
            page_url: None,
            environment: RuntimeEnvironment::Production,
        };
        let result = MonitorOptions::new().resolve(&host);
        assert!(matches!(result, Err(MonitorError::MissingUrl)));
    }

    #[test]
    fn test_invalid_url() {
        let result = MonitorOptions::new()
            .with_url("not a url")
            .resolve(&production("https://app.example.com/"));
        assert!(matches!(result, Err(MonitorError::InvalidUrl { .. })));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = MonitorOptions::new()
            .with_check_interval(Duration::ZERO)
            .resolve(&production("https://app.example.com/"));
        assert!(matches!(result, Err(MonitorError::ValidationError(_))));
    }

    #[test]
    fn test_merge_overlays_set_fields() {
        let base = MonitorOptions::new()
            .with_url("https://a.example.com/")
            .with_check_interval(Duration::from_secs(10));
        let overlay = MonitorOptions::new().with_update_mode(UpdateMode::Immediate);

        let merged = base.merge(overlay);
        assert_eq!(
            merged,
            MonitorOptions::new()
                .with_url("https://a.example.com/")
                .with_check_interval(Duration::from_secs(10))
                .with_update_mode(UpdateMode::Immediate)
        );
    }

    #[test]
    fn test_parse_modes_and_environments() {
        assert_eq!("Manual".parse::<UpdateMode>().unwrap(), UpdateMode::Manual);
        assert_eq!(" disabled ".parse::<UpdateMode>().unwrap(), UpdateMode::Disabled);
        assert!("sometimes".parse::<UpdateMode>().is_err());

        assert_eq!(
            "prod".parse::<RuntimeEnvironment>().unwrap(),
            RuntimeEnvironment::Production
        );
        assert_eq!(
            "dev".parse::<RuntimeEnvironment>().unwrap(),
            RuntimeEnvironment::Development
        );
        assert!("staging".parse::<RuntimeEnvironment>().is_err());
    }
}
