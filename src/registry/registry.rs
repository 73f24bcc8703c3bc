//! # Subscription registry - signal-indexed table of subscriber bitmasks.
//!
//! One [`SubscriberMask`] per signal, in a dense array sized `max_signal`
//! that is zero-filled at construction and never resized. The bit for
//! priority `p` in `masks[s]` is set iff the object at priority `p`
//! currently wants signal `s`.
//!
//! ## Rules
//! - Construction happens exactly once, before any other operation, and is
//!   not meant to race with use (ownership hands the finished table over).
//! - `subscribe`/`unsubscribe` accept only signals in the application range
//!   `USER_SIG..max_signal`; the reserved range is the framework's.
//! - `unsubscribe_all` clears one signal at a time, each under its own
//!   atomic read-modify-write, so a higher-priority interrupt-context
//!   publisher is never stalled behind a table-wide sweep.
//! - Clearing a bit does not flush events already queued for that object;
//!   queued and in-flight deliveries still arrive. Documented weak
//!   guarantee, not a bug.

use crate::config::Config;
use crate::error::BuildError;
use crate::events::{Signal, USER_SIG};
use crate::fault::{self, Violation};
use crate::objects::Priority;
use crate::registry::mask::SubscriberMask;

/// Signal-indexed subscription table.
pub struct SubscriptionRegistry {
    masks: Box<[SubscriberMask]>,
    max_signal: Signal,
    max_active: Priority,
}

impl SubscriptionRegistry {
    /// Allocates the zero-filled table for the configured dimensions.
    pub fn new(config: &Config) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self {
            masks: (0..config.max_signal)
                .map(|_| SubscriberMask::new(config.max_active))
                .collect(),
            max_signal: config.max_signal,
            max_active: config.max_active,
        })
    }

    /// One past the highest publishable signal.
    #[inline]
    pub fn max_signal(&self) -> Signal {
        self.max_signal
    }

    /// Highest priority a mask can hold.
    #[inline]
    pub fn max_active(&self) -> Priority {
        self.max_active
    }

    /// Records that the object at `priority` wants `signal`.
    pub fn subscribe(&self, priority: Priority, signal: Signal) {
        self.check_user_signal(signal);
        self.check_priority(priority);
        self.masks[usize::from(signal)].set(priority);
    }

    /// Stops future deliveries of `signal` to the object at `priority`.
    pub fn unsubscribe(&self, priority: Priority, signal: Signal) {
        self.check_user_signal(signal);
        self.check_priority(priority);
        self.masks[usize::from(signal)].clear(priority);
    }

    /// Clears `priority` from every application signal.
    ///
    /// Each signal is cleared under its own short window rather than one
    /// table-wide lock; concurrent publishers observe each signal's mask
    /// either before or after its individual clear.
    pub fn unsubscribe_all(&self, priority: Priority) {
        self.check_priority(priority);
        for signal in USER_SIG..self.max_signal {
            if self.masks[usize::from(signal)].clear(priority) {
                tracing::trace!(signal, priority, "unsubscribed");
            }
        }
    }

    /// The subscriber mask for `signal`.
    pub fn subscribers_of(&self, signal: Signal) -> &SubscriberMask {
        self.check_signal(signal);
        &self.masks[usize::from(signal)]
    }

    fn check_signal(&self, signal: Signal) {
        if signal >= self.max_signal {
            fault::raise(Violation::SignalOutOfRange {
                signal,
                max_signal: self.max_signal,
            });
        }
    }

    fn check_user_signal(&self, signal: Signal) {
        if signal < USER_SIG {
            fault::raise(Violation::ReservedSignal { signal });
        }
        self.check_signal(signal);
    }

    fn check_priority(&self, priority: Priority) {
        if priority == 0 || priority > self.max_active {
            fault::raise(Violation::PriorityOutOfRange {
                priority,
                max_active: self.max_active,
            });
        }
    }
}
