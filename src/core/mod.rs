//! Core update monitoring types.

mod builder;
mod controller;
mod fingerprint;
mod monitor;
mod options;
mod settings;
mod validation;

pub use builder::UpdateMonitorBuilder;
pub use controller::UpdateMonitor;
pub use fingerprint::fingerprint;
pub use monitor::{MonitorHandle, activate};
pub use options::{
    DEFAULT_CHECK_INTERVAL, ENVIRONMENT_VAR, HostContext, MonitorConfig, MonitorOptions,
    RuntimeEnvironment, UpdateMode,
};
pub use settings::{DEFAULT_ENV_PREFIX, MonitorSettings, SettingsLoader};
pub use validation::Validate;
