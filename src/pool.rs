//! # Event-pool collaborator.
//!
//! Allocation and reclamation of pooled events belong to the surrounding
//! runtime. This core only signals, through [`EventPool::reclaim`], that the
//! last logical reference to an event is gone; the pool finalizes the slot.

use crate::events::EventRef;
use crate::fault::{self, Violation};

/// Reclamation sink for pool-owned events.
///
/// Invoked by the [`Lifecycle`](crate::events::Lifecycle) tracker exactly
/// once per event, when its reference count reaches zero.
pub trait EventPool: Send + Sync {
    /// Finalizes an event whose last reference was just released.
    fn reclaim(&self, event: &EventRef);
}

/// Default collaborator for deployments that publish only static events.
///
/// Reaching reclamation through it means a pooled event was published with
/// no pool wired in, which is a configuration bug and therefore fatal.
pub struct NoPool;

impl EventPool for NoPool {
    fn reclaim(&self, event: &EventRef) {
        fault::raise(Violation::PoolUnavailable {
            pool: event.pool_id().unwrap_or(0),
        });
    }
}
