//! # Scheduler-lock collaborator.
//!
//! During a multicast the dispatcher locks the external scheduler up to the
//! priority of the *highest* subscriber it encounters. Objects strictly
//! above the ceiling keep preempting freely; objects at or below it cannot
//! run until the multicast completes, which is what serializes queue
//! arrival order across concurrent publishers.
//!
//! The lock is taken at most once per publish call and released exactly
//! once after the scan.

use crate::objects::Priority;

/// Opaque state returned by [`SchedulerLock::lock`] and consumed by
/// [`SchedulerLock::unlock`].
#[derive(Debug, Clone, Copy)]
pub struct SchedToken {
    /// The ceiling this lock established.
    pub ceiling: Priority,
    /// The ceiling in force before this lock; restored on unlock.
    pub previous: Priority,
}

/// Priority-ceiling lock over the runtime's scheduler.
pub trait SchedulerLock: Send + Sync {
    /// Prevents objects at or below `ceiling` from running.
    fn lock(&self, ceiling: Priority) -> SchedToken;

    /// Restores the pre-lock state.
    fn unlock(&self, token: SchedToken);
}

/// Lock for runtimes with no preemption source (single-threaded hosts,
/// tests): both operations do nothing.
pub struct NullScheduler;

impl SchedulerLock for NullScheduler {
    fn lock(&self, ceiling: Priority) -> SchedToken {
        SchedToken {
            ceiling,
            previous: 0,
        }
    }

    fn unlock(&self, _token: SchedToken) {}
}
