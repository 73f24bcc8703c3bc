//! # Static configuration of the multicast core.
//!
//! [`Config`] fixes the two dimensions of the runtime before the first
//! subscription or publication: the signal space and the priority ladder.
//! Both are validated once, when the [`Multicaster`](crate::Multicaster)
//! is built, and never change afterwards.
//!
//! # Example
//! ```
//! use sigcast::Config;
//!
//! let mut cfg = Config::default();
//! cfg.max_signal = 128;
//! cfg.max_active = 16;
//!
//! assert_eq!(cfg.max_active, 16);
//! ```

use crate::error::BuildError;
use crate::events::{Signal, USER_SIG};
use crate::objects::Priority;

/// Dimensions of the subscription table and the priority ladder.
///
/// `max_signal` bounds the publishable signal space (signals are valid in
/// `0..max_signal`; only `USER_SIG..max_signal` may be subscribed to).
/// `max_active` bounds the number of active objects (priorities are valid
/// in `1..=max_active`).
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// One past the highest publishable signal. Sizes the subscription table.
    pub max_signal: Signal,
    /// Highest active-object priority. Sizes each subscriber bitmask.
    pub max_active: Priority,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `max_signal = 64`
    /// - `max_active = 32`
    fn default() -> Self {
        Self {
            max_signal: 64,
            max_active: 32,
        }
    }
}

impl Config {
    /// Checks that the configured dimensions leave the runtime usable.
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.max_signal <= USER_SIG {
            return Err(BuildError::SignalSpaceTooSmall {
                max_signal: self.max_signal,
            });
        }
        if self.max_active == 0 {
            return Err(BuildError::NoActiveObjects);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let cfg = Config::default();
        assert_eq!(cfg.max_signal, 64);
        assert_eq!(cfg.max_active, 32);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_signal_space_must_exceed_reserved_range() {
        let cfg = Config {
            max_signal: USER_SIG,
            max_active: 8,
        };
        assert!(matches!(
            cfg.validate(),
            Err(BuildError::SignalSpaceTooSmall { .. })
        ));
    }

    #[test]
    fn test_at_least_one_priority_required() {
        let cfg = Config {
            max_signal: 32,
            max_active: 0,
        };
        assert!(matches!(cfg.validate(), Err(BuildError::NoActiveObjects)));
    }
}
