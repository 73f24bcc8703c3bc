//! Build-time errors of the multicast core.
//!
//! [`BuildError`] is the only recoverable error surface in this crate: it is
//! returned while wiring a [`Multicaster`](crate::Multicaster), before the
//! runtime window opens. Once the core is running, every detectable fault is
//! a contract violation and goes through the fatal path in
//! [`fault`](crate::fault) instead.

use thiserror::Error;

use crate::events::Signal;
use crate::objects::Priority;

/// # Errors detected while building the multicast core.
///
/// These represent configuration mistakes that are caught before any
/// subscription or publication can happen.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BuildError {
    /// The signal space does not extend past the reserved range.
    #[error("max_signal {max_signal} must exceed the reserved signal range")]
    SignalSpaceTooSmall {
        /// The configured signal-space bound.
        max_signal: Signal,
    },

    /// The priority ladder is empty.
    #[error("max_active must be at least 1")]
    NoActiveObjects,

    /// The injected directory cannot hold every configured priority.
    #[error("directory capacity {capacity} does not cover max_active {max_active}")]
    DirectoryTooSmall {
        /// Capacity of the injected directory.
        capacity: Priority,
        /// The configured priority-ladder bound.
        max_active: Priority,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use sigcast::BuildError;
    ///
    /// let err = BuildError::NoActiveObjects;
    /// assert_eq!(err.as_label(), "no_active_objects");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::SignalSpaceTooSmall { .. } => "signal_space_too_small",
            BuildError::NoActiveObjects => "no_active_objects",
            BuildError::DirectoryTooSmall { .. } => "directory_too_small",
        }
    }
}
