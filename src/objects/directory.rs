//! # Active-object directory.
//!
//! [`Directory`] maps each priority to the object registered at it. The
//! surrounding runtime owns registration; the multicast core only *reads*
//! the table — to validate identity on subscribe/unsubscribe and to fetch
//! the handle when posting.
//!
//! ## Rules
//! - At most one object per priority; registering into an occupied slot is
//!   a fatal contract violation.
//! - A priority is never reused while its object remains registered.
//! - Lookups are lock-bounded reads; registration happens during startup,
//!   not on the publish path.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::fault::{self, Violation};
use crate::objects::{ActiveObject, Priority};

/// Priority-indexed table of registered active objects.
pub struct Directory {
    slots: RwLock<Vec<Option<Arc<dyn ActiveObject>>>>,
    capacity: Priority,
}

impl Directory {
    /// Creates an empty directory covering priorities `1..=max_active`.
    #[must_use]
    pub fn new(max_active: Priority) -> Self {
        Self {
            slots: RwLock::new((0..max_active).map(|_| None).collect()),
            capacity: max_active,
        }
    }

    /// Highest priority this directory can hold.
    #[inline]
    pub fn capacity(&self) -> Priority {
        self.capacity
    }

    /// Registers `object` at its own priority.
    ///
    /// Fatal if the priority is out of range or the slot is occupied.
    pub fn register(&self, object: Arc<dyn ActiveObject>) {
        let priority = object.priority();
        let slot = self.index_of(priority);
        let mut slots = self.slots.write();
        if slots[slot].is_some() {
            fault::raise(Violation::DuplicatePriority { priority });
        }
        tracing::debug!(priority, object = object.name(), "registered");
        slots[slot] = Some(object);
    }

    /// Removes and returns the object at `priority`, if any.
    pub fn deregister(&self, priority: Priority) -> Option<Arc<dyn ActiveObject>> {
        let slot = self.index_of(priority);
        let removed = self.slots.write()[slot].take();
        if let Some(object) = &removed {
            tracing::debug!(priority, object = object.name(), "deregistered");
        }
        removed
    }

    /// Returns the object registered at `priority`.
    ///
    /// `None` both for an empty slot and for a priority outside
    /// `1..=capacity` — resolution is total, the *callers* decide which
    /// absences are contract violations.
    pub fn resolve(&self, priority: Priority) -> Option<Arc<dyn ActiveObject>> {
        if priority == 0 || priority > self.capacity {
            return None;
        }
        self.slots.read()[usize::from(priority) - 1].clone()
    }

    /// True if `handle` is the object registered at `priority`.
    ///
    /// Compares data pointers only: two handles to the same object agree
    /// even when their vtable pointers differ across coercion sites.
    pub(crate) fn holds(&self, priority: Priority, handle: &Arc<dyn ActiveObject>) -> bool {
        match self.resolve(priority) {
            Some(registered) => std::ptr::eq(
                Arc::as_ptr(&registered) as *const (),
                Arc::as_ptr(handle) as *const (),
            ),
            None => false,
        }
    }

    fn index_of(&self, priority: Priority) -> usize {
        if priority == 0 || priority > self.capacity {
            fault::raise(Violation::PriorityOutOfRange {
                priority,
                max_active: self.capacity,
            });
        }
        usize::from(priority) - 1
    }
}
