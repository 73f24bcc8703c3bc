//! # Event lifecycle tracker.
//!
//! [`Lifecycle`] mediates every increment and decrement of a pooled event's
//! reference count, so that one instance stays valid for the full duration
//! of a multicast no matter how quickly any individual subscriber consumes
//! and releases its copy. Static events pass through untouched.
//!
//! ## Rules
//! - [`Lifecycle::acquire`] is a no-op for static events; for pooled events
//!   it adds one logical reference.
//! - [`Lifecycle::release`] is a no-op for static events; for pooled events
//!   it removes one reference and, on reaching zero, hands the event to the
//!   external pool collaborator for reclamation — exactly once.
//! - The dispatcher's temporary "in-flight" reference is modeled by
//!   [`InFlight`], a guard acquired before the subscriber scan and released
//!   on drop, covering every exit path.
//!
//! ## Counting walkthrough
//! ```text
//! publisher allocates, acquires          refs = 1
//! publish: in-flight acquire             refs = 2
//!          deliver to prio 5, acquire    refs = 3
//!          deliver to prio 2, acquire    refs = 4
//!          in-flight release             refs = 3
//! publisher releases                     refs = 2
//! prio 5 finishes, releases              refs = 1
//! prio 2 finishes, releases              refs = 0  → pool.reclaim(event)
//! ```

use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::events::EventRef;
use crate::fault::{self, Violation};
use crate::pool::EventPool;

/// Reference-count mediator for pooled events.
///
/// Owns the handle to the external pool collaborator; reclamation is always
/// delegated, never performed here.
pub struct Lifecycle {
    pool: Arc<dyn EventPool>,
}

impl Lifecycle {
    /// Creates a tracker that delegates reclamation to `pool`.
    pub fn new(pool: Arc<dyn EventPool>) -> Self {
        Self { pool }
    }

    /// Adds one logical reference. No-op for static events.
    ///
    /// Overflowing the counter width is a contract violation: it means more
    /// simultaneous holders than any correctly sized configuration allows.
    pub fn acquire(&self, event: &EventRef) {
        let Some(refs) = event.refs() else { return };
        let prev = refs.fetch_add(1, Ordering::AcqRel);
        if prev == u8::MAX {
            fault::raise(Violation::RefCountOverflow {
                signal: event.signal(),
            });
        }
    }

    /// Removes one logical reference. No-op for static events.
    ///
    /// The holder that drops the count to zero triggers reclamation through
    /// the pool collaborator. Releasing an unreferenced event is a contract
    /// violation.
    pub fn release(&self, event: &EventRef) {
        let Some(refs) = event.refs() else { return };
        match refs.fetch_sub(1, Ordering::AcqRel) {
            0 => fault::raise(Violation::RefCountUnderflow {
                signal: event.signal(),
            }),
            1 => {
                tracing::trace!(
                    signal = event.signal(),
                    pool = event.pool_id(),
                    "event reclaimed"
                );
                self.pool.reclaim(event);
            }
            _ => {}
        }
    }

    /// Acquires the dispatcher's temporary reference for the duration of a
    /// multicast. Released when the returned guard drops.
    pub fn in_flight<'a>(&'a self, event: &'a EventRef) -> InFlight<'a> {
        self.acquire(event);
        InFlight {
            lifecycle: self,
            event,
        }
    }
}

/// Holds the dispatcher's temporary reference on a published event.
///
/// Dropping the guard releases the reference; if nobody else holds one
/// (published with no subscribers, publisher kept nothing), the event is
/// reclaimed right here.
#[must_use = "dropping the guard is what releases the in-flight reference"]
pub struct InFlight<'a> {
    lifecycle: &'a Lifecycle,
    event: &'a EventRef,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.lifecycle.release(self.event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct CountingPool {
        reclaimed: Mutex<Vec<u16>>,
    }

    impl EventPool for CountingPool {
        fn reclaim(&self, event: &EventRef) {
            self.reclaimed.lock().push(event.signal());
        }
    }

    fn tracker() -> (Lifecycle, Arc<CountingPool>) {
        let pool = Arc::new(CountingPool::default());
        (Lifecycle::new(pool.clone()), pool)
    }

    #[test]
    fn test_static_events_are_untouched() {
        let (lc, pool) = tracker();
        let ev: EventRef = Arc::new(Event::immutable(10));
        lc.acquire(&ev);
        lc.release(&ev);
        assert_eq!(ev.ref_count(), 0);
        assert!(pool.reclaimed.lock().is_empty());
    }

    #[test]
    fn test_release_at_zero_reclaims_exactly_once() {
        let (lc, pool) = tracker();
        let ev: EventRef = Arc::new(Event::pooled(11, 1));
        lc.acquire(&ev);
        lc.acquire(&ev);
        lc.release(&ev);
        assert!(pool.reclaimed.lock().is_empty(), "count is still 1");
        lc.release(&ev);
        assert_eq!(pool.reclaimed.lock().as_slice(), &[11]);
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let (lc, pool) = tracker();
        let ev: EventRef = Arc::new(Event::pooled(12, 1));
        {
            let _flight = lc.in_flight(&ev);
            assert_eq!(ev.ref_count(), 1);
        }
        assert_eq!(ev.ref_count(), 0);
        assert_eq!(
            pool.reclaimed.lock().len(),
            1,
            "sole reference was the in-flight one"
        );
    }

    #[test]
    #[should_panic(expected = "ref_count_underflow")]
    fn test_release_of_unreferenced_event_is_fatal() {
        let (lc, _pool) = tracker();
        let ev: EventRef = Arc::new(Event::pooled(13, 1));
        lc.release(&ev);
    }
}
