//! Error types for deploy-watch.

use std::fmt;

/// Result type alias for deploy-watch operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur when configuring or running an update monitor.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Failed to load monitor settings from a source.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// Failed to deserialize monitor settings.
    #[error("Failed to deserialize settings: {0}")]
    DeserializationError(String),

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// The URL to poll could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL text
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Neither an explicit URL nor a page URL was supplied.
    #[error("No URL to poll: set a url or provide the host page URL")]
    MissingUrl,

    /// No new-version callback was registered.
    #[error("An on_new_version_available callback is required")]
    MissingCallback,

    /// Activation was attempted outside of a tokio runtime.
    #[error("Update monitor requires a running tokio runtime")]
    NoRuntime,

    /// Fetching the reference resource failed.
    #[error("Fetch failed: {0}")]
    FetchError(String),

    /// The reference resource answered with a non-success status.
    #[error("Fetch failed with status {status}: {reason}")]
    HttpStatus {
        /// Numeric HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// IO error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Monitor error: {0}")]
    Other(String),
}

/// Validation error for monitor configuration.
#[derive(Debug)]
pub enum ValidationError {
    /// A specific field has an invalid value.
    InvalidField {
        /// The field name
        field: String,
        /// The reason why it's invalid
        reason: String,
    },
}

impl ValidationError {
    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for MonitorError {
    fn from(err: ValidationError) -> Self {
        MonitorError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_converts() {
        let err: MonitorError =
            ValidationError::invalid_field("check_interval", "must be greater than 0").into();
        assert_eq!(
            err.to_string(),
            "Configuration validation failed: Field 'check_interval' is invalid: must be greater than 0"
        );
    }

    #[test]
    fn test_unknown_mode_names_the_field() {
        let err = "sometimes".parse::<crate::core::UpdateMode>().unwrap_err();
        assert!(matches!(err, MonitorError::ValidationError(_)));
        assert!(err.to_string().contains("Field 'update_mode' is invalid"));
    }
}
