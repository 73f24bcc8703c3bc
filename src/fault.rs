//! # Fatal contract violations.
//!
//! Every fault this core can detect at runtime is a programming or
//! configuration error, never an environmental one: an out-of-range signal,
//! a mismatched priority, a subscriber with no registered object, a full
//! event queue. There is no recovery path for any of them — a violated
//! contract means the static configuration was wrong, and a real-time
//! system is better served by halting loudly than by degrading silently.
//!
//! ## Contract
//! - Each public operation checks its preconditions on entry and routes a
//!   failed check through [`raise`], which never returns.
//! - The handler can be replaced **once**, before the runtime window opens,
//!   via [`set_fatal_handler`] — embedded targets typically divert to a
//!   platform fault hook or reset.
//! - The default handler panics with the violation's label and message,
//!   which is what lets tests observe fatal paths with `#[should_panic]`.

use std::fmt;

use once_cell::sync::OnceCell;

use crate::events::{PoolId, Signal};
use crate::objects::Priority;

/// A violated precondition, carrying enough context for post-mortem
/// diagnosis.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// A signal at or beyond the configured signal space was used.
    SignalOutOfRange {
        /// The offending signal.
        signal: Signal,
        /// The configured signal-space bound.
        max_signal: Signal,
    },

    /// A subscription operation named a signal inside the reserved range.
    ReservedSignal {
        /// The offending signal.
        signal: Signal,
    },

    /// A priority outside `1..=max_active` was used.
    PriorityOutOfRange {
        /// The offending priority.
        priority: Priority,
        /// The configured priority-ladder bound.
        max_active: Priority,
    },

    /// A subscription operation was invoked with a handle that is not the
    /// object registered at its own priority.
    IdentityMismatch {
        /// The priority whose directory entry did not match.
        priority: Priority,
    },

    /// The scan found a subscribed priority with no registered object.
    UnregisteredSubscriber {
        /// The subscribed priority with an empty directory slot.
        priority: Priority,
        /// The signal being multicast.
        signal: Signal,
    },

    /// A target queue rejected a posted event.
    QueueOverflow {
        /// The priority whose queue overflowed.
        priority: Priority,
        /// The signal of the rejected event.
        signal: Signal,
    },

    /// Two objects were registered at the same priority.
    DuplicatePriority {
        /// The contested priority.
        priority: Priority,
    },

    /// A pool-owned event's reference count was incremented past its width.
    RefCountOverflow {
        /// The signal of the over-referenced event.
        signal: Signal,
    },

    /// A pool-owned event was released more often than it was acquired.
    RefCountUnderflow {
        /// The signal of the over-released event.
        signal: Signal,
    },

    /// A pool-owned event reached reclamation with no pool collaborator
    /// configured.
    PoolUnavailable {
        /// The pool the event claims to come from.
        pool: PoolId,
    },
}

impl Violation {
    /// Returns a short stable label (snake_case) identifying the violated
    /// contract.
    pub fn as_label(&self) -> &'static str {
        match self {
            Violation::SignalOutOfRange { .. } => "signal_out_of_range",
            Violation::ReservedSignal { .. } => "reserved_signal",
            Violation::PriorityOutOfRange { .. } => "priority_out_of_range",
            Violation::IdentityMismatch { .. } => "identity_mismatch",
            Violation::UnregisteredSubscriber { .. } => "unregistered_subscriber",
            Violation::QueueOverflow { .. } => "queue_overflow",
            Violation::DuplicatePriority { .. } => "duplicate_priority",
            Violation::RefCountOverflow { .. } => "ref_count_overflow",
            Violation::RefCountUnderflow { .. } => "ref_count_underflow",
            Violation::PoolUnavailable { .. } => "pool_unavailable",
        }
    }

    /// Returns a human-readable message with details about the violation.
    pub fn as_message(&self) -> String {
        match self {
            Violation::SignalOutOfRange { signal, max_signal } => {
                format!("signal {signal} outside 0..{max_signal}")
            }
            Violation::ReservedSignal { signal } => {
                format!("signal {signal} is inside the reserved range")
            }
            Violation::PriorityOutOfRange {
                priority,
                max_active,
            } => format!("priority {priority} outside 1..={max_active}"),
            Violation::IdentityMismatch { priority } => {
                format!("handle is not the object registered at priority {priority}")
            }
            Violation::UnregisteredSubscriber { priority, signal } => {
                format!("priority {priority} subscribed to signal {signal} but not registered")
            }
            Violation::QueueOverflow { priority, signal } => {
                format!("queue at priority {priority} rejected signal {signal}")
            }
            Violation::DuplicatePriority { priority } => {
                format!("priority {priority} already registered")
            }
            Violation::RefCountOverflow { signal } => {
                format!("reference count overflow on signal {signal}")
            }
            Violation::RefCountUnderflow { signal } => {
                format!("reference count underflow on signal {signal}")
            }
            Violation::PoolUnavailable { pool } => {
                format!("no pool collaborator for pool id {pool}")
            }
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.as_label(), self.as_message())
    }
}

/// Handler invoked on a contract violation. Must not return.
pub type FatalHandler = fn(&Violation) -> !;

static HANDLER: OnceCell<FatalHandler> = OnceCell::new();

/// Installs the process-wide fatal handler.
///
/// Returns `false` if a handler was already installed (the first one wins).
/// Must be called before the runtime window opens; a handler installed
/// mid-flight would race with concurrent [`raise`] calls on other cores.
pub fn set_fatal_handler(handler: FatalHandler) -> bool {
    HANDLER.set(handler).is_ok()
}

/// Routes a contract violation to the installed handler.
///
/// With no handler installed this panics with the violation's label and
/// message, so fatal paths stay observable in host tests.
pub fn raise(violation: Violation) -> ! {
    tracing::error!(violation = %violation, "contract violation");
    match HANDLER.get() {
        Some(handler) => handler(&violation),
        None => panic!("contract violation {violation}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let v = Violation::QueueOverflow {
            priority: 3,
            signal: 7,
        };
        assert_eq!(v.as_label(), "queue_overflow");
        assert!(v.as_message().contains("priority 3"));
    }

    #[test]
    fn test_display_carries_label_and_context() {
        let v = Violation::SignalOutOfRange {
            signal: 64,
            max_signal: 64,
        };
        let text = v.to_string();
        assert!(text.contains("signal_out_of_range"), "{text}");
        assert!(text.contains("64"), "{text}");
    }

    #[test]
    #[should_panic(expected = "identity_mismatch")]
    fn test_default_handler_panics_with_label() {
        raise(Violation::IdentityMismatch { priority: 5 });
    }
}
