//! Configuration validation support.

use crate::error::ValidationError;

/// Trait for configuration validation.
///
/// Resolved monitor configurations implement this trait and are validated
/// before an activation is allowed to start.
///
/// # Examples
///
/// ```rust
/// use deploy_watch::core::Validate;
/// use deploy_watch::error::ValidationError;
/// use std::time::Duration;
///
/// struct PollSchedule {
///     every: Duration,
/// }
///
/// impl Validate for PollSchedule {
///     fn validate(&self) -> Result<(), ValidationError> {
///         if self.every.is_zero() {
///             return Err(ValidationError::invalid_field(
///                 "every",
///                 "must be greater than 0"
///             ));
///         }
///
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Should return a `ValidationError` describing what validation failed.
    fn validate(&self) -> Result<(), ValidationError>;
}
