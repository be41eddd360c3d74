//! New-version notification.
//!
//! Holds the host's callback so it can be replaced while a monitor runs.

pub mod callback;

pub use callback::CallbackSlot;
