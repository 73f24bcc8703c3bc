//! # Multicaster: priority-ordered event multicast with scheduler locking.
//!
//! The [`Multicaster`] owns the subscription table and the injected
//! collaborator handles. [`Multicaster::publish`] delivers one event to
//! every object subscribed to its signal, in strictly descending priority
//! order, and returns once every copy has been handed to the per-object
//! queues — delivery is asynchronous from the receivers' perspective.
//!
//! ## Key responsibilities
//! - take the dispatcher's temporary reference before the scan and release
//!   it after, so a pooled event survives the whole multicast
//! - lock the scheduler up to the **first** (highest) subscriber found, so
//!   objects above the ceiling keep preempting while everyone at or below
//!   it waits for the multicast to finish
//! - validate the subscribe/unsubscribe identity contract against the
//!   directory before touching the table
//!
//! ## Publish walkthrough
//! ```text
//! publish(event, sender)
//!   ├─ require event.signal < max_signal            (fatal otherwise)
//!   ├─ Lifecycle::acquire          ── in-flight reference (pooled only)
//!   ├─ mask = registry[signal]
//!   ├─ for p in mask, highest → lowest:
//!   │     ├─ first p: scheduler.lock(ceiling = p)
//!   │     ├─ directory.resolve(p)                   (fatal if empty)
//!   │     ├─ Lifecycle::acquire    ── the queue's reference
//!   │     └─ p.post(event)                          (fatal on overflow)
//!   ├─ scheduler.unlock                             (if locked)
//!   └─ Lifecycle::release          ── reclaims when nobody subscribed
//! ```
//!
//! Visiting in any other order would break the ceiling computation: a later
//! higher-priority subscriber would either run before receiving its own
//! copy (under-lock) or unrelated higher work would be stalled (over-lock).

use std::sync::Arc;

use crate::events::{EventRef, Lifecycle, Signal};
use crate::fault::{self, Violation};
use crate::objects::{ActiveObject, Directory, Priority};
use crate::registry::{SubscriberMask, SubscriptionRegistry};
use crate::sched::{SchedToken, SchedulerLock};

/// Publish-subscribe multicast core.
///
/// Built once via [`Multicaster::builder`](crate::Multicaster::builder);
/// all state either never changes shape (the table) or is touched only
/// through short atomic windows, so every operation is callable from
/// interrupt-like contexts.
pub struct Multicaster {
    pub(crate) registry: SubscriptionRegistry,
    pub(crate) directory: Arc<Directory>,
    pub(crate) scheduler: Arc<dyn SchedulerLock>,
    pub(crate) lifecycle: Lifecycle,
}

impl Multicaster {
    /// Delivers `event` to every subscriber of its signal, highest priority
    /// first.
    ///
    /// `sender` is an observability-only context tag carried into trace
    /// records; it never influences delivery.
    ///
    /// Returns after the last queue accepted its copy. Any contract
    /// violation on the way — out-of-range signal, a subscribed priority
    /// with no registered object, a full target queue — is fatal.
    pub fn publish(&self, event: &EventRef, sender: &str) {
        let signal = event.signal();
        if signal >= self.registry.max_signal() {
            fault::raise(Violation::SignalOutOfRange {
                signal,
                max_signal: self.registry.max_signal(),
            });
        }

        tracing::trace!(
            signal,
            sender,
            pool = event.pool_id(),
            refs = event.ref_count(),
            "publish"
        );

        let flight = self.lifecycle.in_flight(event);
        let mut lock: Option<SchedToken> = None;

        for priority in self.registry.subscribers_of(signal).iter_descending() {
            // The first bit is the highest subscriber: that is the ceiling.
            if lock.is_none() {
                lock = Some(self.scheduler.lock(priority));
            }

            let Some(target) = self.directory.resolve(priority) else {
                fault::raise(Violation::UnregisteredSubscriber { priority, signal });
            };

            // The queue's own reference for this copy; the consumer
            // releases it after processing.
            self.lifecycle.acquire(event);
            if target.post(event.clone()).is_err() {
                fault::raise(Violation::QueueOverflow { priority, signal });
            }
        }

        if let Some(token) = lock {
            self.scheduler.unlock(token);
        }

        // Release the in-flight reference only after the scheduler is
        // unlocked; this also reclaims the published-but-unsubscribed case.
        drop(flight);
    }

    /// Starts delivering published events with `signal` to `object`.
    ///
    /// `object` must be registered in the directory at its own priority;
    /// subscribing on behalf of a stale or mismatched handle is fatal.
    pub fn subscribe(&self, object: &Arc<dyn ActiveObject>, signal: Signal) {
        let priority = self.checked_identity(object);
        tracing::trace!(signal, priority, object = object.name(), "subscribe");
        self.registry.subscribe(priority, signal);
    }

    /// Stops delivering published events with `signal` to `object`.
    ///
    /// Events already sitting in the object's queue are still delivered;
    /// unsubscribing does not flush them.
    pub fn unsubscribe(&self, object: &Arc<dyn ActiveObject>, signal: Signal) {
        let priority = self.checked_identity(object);
        tracing::trace!(signal, priority, object = object.name(), "unsubscribe");
        self.registry.unsubscribe(priority, signal);
    }

    /// Removes `object` from every application signal, one signal at a
    /// time. Same queue caveat as [`Multicaster::unsubscribe`].
    pub fn unsubscribe_all(&self, object: &Arc<dyn ActiveObject>) {
        let priority = self.checked_identity(object);
        tracing::trace!(priority, object = object.name(), "unsubscribe_all");
        self.registry.unsubscribe_all(priority);
    }

    /// Read-only view of the subscribers of `signal`.
    pub fn subscribers_of(&self, signal: Signal) -> &SubscriberMask {
        self.registry.subscribers_of(signal)
    }

    /// The active-object directory this core resolves against.
    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// The lifecycle tracker; consumers use it to release their queue
    /// copies after processing.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn checked_identity(&self, object: &Arc<dyn ActiveObject>) -> Priority {
        let priority = object.priority();
        if priority == 0 || priority > self.directory.capacity() {
            fault::raise(Violation::PriorityOutOfRange {
                priority,
                max_active: self.directory.capacity(),
            });
        }
        if !self.directory.holds(priority, object) {
            fault::raise(Violation::IdentityMismatch { priority });
        }
        priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::{Event, EventRef, USER_SIG};
    use crate::objects::QueueFull;
    use crate::pool::EventPool;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Lock(Priority),
        Unlock(Priority),
        Post(Priority),
    }

    type Ops = Arc<Mutex<Vec<Op>>>;

    struct RecordingScheduler {
        ops: Ops,
    }

    impl SchedulerLock for RecordingScheduler {
        fn lock(&self, ceiling: Priority) -> SchedToken {
            self.ops.lock().push(Op::Lock(ceiling));
            SchedToken {
                ceiling,
                previous: 0,
            }
        }

        fn unlock(&self, token: SchedToken) {
            self.ops.lock().push(Op::Unlock(token.ceiling));
        }
    }

    #[derive(Default)]
    struct CountingPool {
        reclaimed: Mutex<Vec<Signal>>,
    }

    impl EventPool for CountingPool {
        fn reclaim(&self, event: &EventRef) {
            self.reclaimed.lock().push(event.signal());
        }
    }

    struct Sink {
        priority: Priority,
        ops: Ops,
        held: Mutex<Vec<EventRef>>,
        reject: bool,
    }

    impl Sink {
        fn new(priority: Priority, ops: &Ops) -> Arc<Self> {
            Arc::new(Self {
                priority,
                ops: ops.clone(),
                held: Mutex::new(Vec::new()),
                reject: false,
            })
        }
    }

    impl ActiveObject for Sink {
        fn priority(&self) -> Priority {
            self.priority
        }

        fn post(&self, event: EventRef) -> Result<(), QueueFull> {
            if self.reject {
                return Err(QueueFull);
            }
            self.ops.lock().push(Op::Post(self.priority));
            self.held.lock().push(event);
            Ok(())
        }
    }

    struct Rig {
        cast: Multicaster,
        ops: Ops,
        pool: Arc<CountingPool>,
    }

    fn rig(max_signal: Signal, max_active: Priority) -> Rig {
        let ops: Ops = Arc::new(Mutex::new(Vec::new()));
        let pool = Arc::new(CountingPool::default());
        let cast = Multicaster::builder(Config {
            max_signal,
            max_active,
        })
        .with_scheduler(Arc::new(RecordingScheduler { ops: ops.clone() }))
        .with_pool(pool.clone())
        .build()
        .expect("valid config");
        Rig { cast, ops, pool }
    }

    fn registered_sink(rig: &Rig, priority: Priority) -> Arc<Sink> {
        let sink = Sink::new(priority, &rig.ops);
        rig.cast.directory().register(sink.clone());
        sink
    }

    fn as_object(sink: &Arc<Sink>) -> Arc<dyn ActiveObject> {
        sink.clone()
    }

    #[test]
    fn test_delivery_is_descending_and_exactly_once() {
        let rig = rig(10, 8);
        for p in [2, 7, 5] {
            let sink = registered_sink(&rig, p);
            rig.cast.subscribe(&as_object(&sink), 6);
        }

        rig.cast.publish(&Arc::new(Event::immutable(6)), "test");

        let ops = rig.ops.lock();
        assert_eq!(
            ops.as_slice(),
            &[
                Op::Lock(7),
                Op::Post(7),
                Op::Post(5),
                Op::Post(2),
                Op::Unlock(7)
            ]
        );
    }

    // Two subscribers out of a four-rung ladder: the ceiling sits at the
    // higher one for the whole multicast.
    #[test]
    fn test_two_subscriber_scenario_locks_at_highest() {
        let rig = rig(10, 4);
        let low = registered_sink(&rig, 1);
        let high = registered_sink(&rig, 3);
        rig.cast.subscribe(&as_object(&high), 5);
        rig.cast.subscribe(&as_object(&low), 5);

        rig.cast.publish(&Arc::new(Event::immutable(5)), "test");

        let ops = rig.ops.lock();
        assert_eq!(
            ops.as_slice(),
            &[Op::Lock(3), Op::Post(3), Op::Post(1), Op::Unlock(3)]
        );
    }

    #[test]
    fn test_no_subscribers_means_no_posts_and_no_lock() {
        let rig = rig(10, 4);
        let event: EventRef = Arc::new(Event::pooled(5, 1));
        rig.cast.lifecycle().acquire(&event); // the publisher's own reference

        rig.cast.publish(&event, "test");

        assert!(rig.ops.lock().is_empty(), "no lock, no posts");
        assert_eq!(event.ref_count(), 1, "refcount back to pre-publish");
        assert!(rig.pool.reclaimed.lock().is_empty());
    }

    #[test]
    fn test_unheld_event_without_subscribers_is_reclaimed_immediately() {
        let rig = rig(10, 4);
        let event: EventRef = Arc::new(Event::pooled(7, 1));

        rig.cast.publish(&event, "test");

        assert_eq!(rig.pool.reclaimed.lock().as_slice(), &[7]);
        assert_eq!(event.ref_count(), 0);
    }

    #[test]
    fn test_refcount_follows_every_copy_until_reclaim() {
        let rig = rig(10, 4);
        let s1 = registered_sink(&rig, 1);
        let s3 = registered_sink(&rig, 3);
        rig.cast.subscribe(&as_object(&s1), 5);
        rig.cast.subscribe(&as_object(&s3), 5);

        let event: EventRef = Arc::new(Event::pooled(5, 2));
        rig.cast.lifecycle().acquire(&event); // publisher holds one

        rig.cast.publish(&event, "test");
        assert_eq!(event.ref_count(), 3, "publisher + one per queue copy");
        assert!(rig.pool.reclaimed.lock().is_empty());

        rig.cast.lifecycle().release(&event); // publisher done
        for sink in [s1, s3] {
            let copy = sink.held.lock().pop().expect("delivered");
            rig.cast.lifecycle().release(&copy); // consumer done
        }

        assert_eq!(rig.pool.reclaimed.lock().as_slice(), &[5]);
        assert_eq!(event.ref_count(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_future_deliveries() {
        let rig = rig(10, 4);
        let sink = registered_sink(&rig, 2);
        let object = as_object(&sink);
        rig.cast.subscribe(&object, 5);

        rig.cast.publish(&Arc::new(Event::immutable(5)), "test");
        rig.cast.unsubscribe(&object, 5);
        rig.cast.publish(&Arc::new(Event::immutable(5)), "test");

        let posts = rig
            .ops
            .lock()
            .iter()
            .filter(|op| matches!(op, Op::Post(_)))
            .count();
        assert_eq!(posts, 1, "second publish found no subscriber");
    }

    #[test]
    fn test_unsubscribe_all_silences_every_signal() {
        let rig = rig(10, 4);
        let sink = registered_sink(&rig, 2);
        let object = as_object(&sink);
        for signal in USER_SIG..10 {
            rig.cast.subscribe(&object, signal);
        }

        rig.cast.unsubscribe_all(&object);

        for signal in USER_SIG..10 {
            assert!(rig.cast.subscribers_of(signal).is_empty());
        }
    }

    #[test]
    #[should_panic(expected = "signal_out_of_range")]
    fn test_publish_beyond_signal_space_is_fatal() {
        let rig = rig(10, 4);
        rig.cast.publish(&Arc::new(Event::immutable(10)), "test");
    }

    #[test]
    #[should_panic(expected = "identity_mismatch")]
    fn test_subscribe_with_unregistered_handle_is_fatal() {
        let rig = rig(10, 4);
        let stray = Sink::new(2, &rig.ops);
        rig.cast.subscribe(&as_object(&stray), 5);
    }

    #[test]
    #[should_panic(expected = "identity_mismatch")]
    fn test_subscribe_with_stale_handle_is_fatal() {
        let rig = rig(10, 4);
        let _registered = registered_sink(&rig, 2);
        let impostor = Sink::new(2, &rig.ops);
        rig.cast.subscribe(&as_object(&impostor), 5);
    }

    #[test]
    #[should_panic(expected = "priority_out_of_range")]
    fn test_subscribe_with_zero_priority_is_fatal() {
        let rig = rig(10, 4);
        let broken = Sink::new(0, &rig.ops);
        rig.cast.subscribe(&as_object(&broken), 5);
    }

    #[test]
    #[should_panic(expected = "unregistered_subscriber")]
    fn test_publish_to_deregistered_subscriber_is_fatal() {
        let rig = rig(10, 4);
        let sink = registered_sink(&rig, 3);
        rig.cast.subscribe(&as_object(&sink), 5);
        rig.cast.directory().deregister(3);
        rig.cast.publish(&Arc::new(Event::immutable(5)), "test");
    }

    #[test]
    #[should_panic(expected = "queue_overflow")]
    fn test_full_queue_is_fatal() {
        let rig = rig(10, 4);
        let full = Arc::new(Sink {
            priority: 2,
            ops: rig.ops.clone(),
            held: Mutex::new(Vec::new()),
            reject: true,
        });
        rig.cast.directory().register(full.clone());
        rig.cast.subscribe(&as_object(&full), 5);
        rig.cast.publish(&Arc::new(Event::immutable(5)), "test");
    }
}
