//! Loading monitor settings from files and environment variables.

use crate::core::{MonitorOptions, RuntimeEnvironment, UpdateMode};
use crate::error::{MonitorError, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default environment variable prefix: `DEPLOY_WATCH_URL`, `DEPLOY_WATCH_UPDATE_MODE`, ...
pub const DEFAULT_ENV_PREFIX: &str = "DEPLOY_WATCH";

/// Monitor settings as they appear in a settings file or the environment.
///
/// ```yaml
/// url: https://app.example.com/
/// check_interval_ms: 60000
/// update_mode: manual
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Resource to poll. Defaults to the host page URL.
    pub url: Option<String>,
    /// Milliseconds between polls.
    pub check_interval_ms: Option<u64>,
    /// Update mode override.
    pub update_mode: Option<UpdateMode>,
    /// Runtime environment override.
    pub environment: Option<RuntimeEnvironment>,
}

impl MonitorSettings {
    /// Convert into monitor options, leaving unset fields to their defaults.
    pub fn to_options(&self) -> MonitorOptions {
        let mut options = MonitorOptions::new();
        if let Some(url) = &self.url {
            options = options.with_url(url.clone());
        }
        if let Some(ms) = self.check_interval_ms {
            options = options.with_check_interval(Duration::from_millis(ms));
        }
        if let Some(mode) = self.update_mode {
            options = options.with_update_mode(mode);
        }
        options
    }
}

/// Loads [`MonitorSettings`] from layered sources.
///
/// Files are applied in the order they were added; environment variables are
/// applied last and take precedence over every file.
///
/// # Examples
///
/// ```rust,no_run
/// use deploy_watch::core::SettingsLoader;
///
/// # fn example() -> deploy_watch::error::Result<()> {
/// let settings = SettingsLoader::new()
///     .with_file("config/deploy-watch.yaml")
///     .with_env_overrides("DEPLOY_WATCH")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SettingsLoader {
    files: Vec<(PathBuf, bool)>,
    env_prefix: Option<String>,
}

impl SettingsLoader {
    /// Create a loader with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required settings file (YAML, TOML, or JSON by extension).
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push((path.into(), true));
        self
    }

    /// Add a settings file that is skipped when absent.
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push((path.into(), false));
        self
    }

    /// Read `<PREFIX>_URL`, `<PREFIX>_CHECK_INTERVAL_MS`, `<PREFIX>_UPDATE_MODE`
    /// and `<PREFIX>_ENVIRONMENT` from the process environment.
    pub fn with_env_overrides(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Load and merge settings from every source.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A file has an unsupported extension
    /// - A required file is missing or cannot be parsed
    /// - A value has the wrong type
    pub fn load(&self) -> Result<MonitorSettings> {
        let mut builder = config::Config::builder();

        for (path, required) in &self.files {
            validate_extension(path)?;
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .try_parsing(true),
            );
        }

        let merged = builder
            .build()
            .map_err(|e| MonitorError::LoadError(format!("Failed to load settings: {}", e)))?;

        merged.try_deserialize::<MonitorSettings>().map_err(|e| {
            MonitorError::DeserializationError(format!("Failed to deserialize settings: {}", e))
        })
    }
}

fn validate_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| {
            MonitorError::LoadError(format!(
                "Unable to determine file format for: {}",
                path.display()
            ))
        })?;

    match extension {
        "yaml" | "yml" | "toml" | "json" => Ok(()),
        _ => Err(MonitorError::LoadError(format!(
            "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
            extension
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("watch.yaml");
        fs::write(
            &path,
            "url: https://app.example.com/\ncheck_interval_ms: 60000\nupdate_mode: immediate\n",
        )
        .unwrap();

        let settings = SettingsLoader::new().with_file(&path).load().unwrap();
        assert_eq!(settings.url.as_deref(), Some("https://app.example.com/"));
        assert_eq!(settings.check_interval_ms, Some(60_000));
        assert_eq!(settings.update_mode, Some(UpdateMode::Immediate));
        assert_eq!(settings.environment, None);
    }

    #[test]
    fn test_later_file_overrides_earlier() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("base.toml");
        let local = temp_dir.path().join("local.json");
        fs::write(&base, "url = \"https://a.example.com/\"\ncheck_interval_ms = 1000\n").unwrap();
        fs::write(&local, r#"{ "check_interval_ms": 5000 }"#).unwrap();

        let settings = SettingsLoader::new()
            .with_file(&base)
            .with_file(&local)
            .load()
            .unwrap();
        assert_eq!(settings.url.as_deref(), Some("https://a.example.com/"));
        assert_eq!(settings.check_interval_ms, Some(5000));
    }

    #[test]
    fn test_missing_optional_file() {
        let settings = SettingsLoader::new()
            .with_optional_file("/nonexistent/deploy-watch.yaml")
            .load()
            .unwrap();
        assert_eq!(settings, MonitorSettings::default());
    }

    #[test]
    fn test_missing_required_file() {
        let result = SettingsLoader::new()
            .with_file("/nonexistent/deploy-watch.yaml")
            .load();
        assert!(matches!(result, Err(MonitorError::LoadError(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SettingsLoader::new().with_file("settings.ini").load();
        assert!(result.is_err());
    }

    #[test]
    fn test_to_options() {
        let settings = MonitorSettings {
            url: Some("https://app.example.com/".to_string()),
            check_interval_ms: Some(250),
            update_mode: Some(UpdateMode::Manual),
            environment: None,
        };

        assert_eq!(
            settings.to_options(),
            MonitorOptions::new()
                .with_url("https://app.example.com/")
                .with_check_interval(Duration::from_millis(250))
                .with_update_mode(UpdateMode::Manual)
        );
    }
}
