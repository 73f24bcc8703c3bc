//! # The event data model.
//!
//! An [`Event`] is an immutable payload header: a [`Signal`] naming what the
//! event means, plus an ownership mode. A `Static` event lives in static or
//! stack storage and is never reclaimed by this subsystem; a `Pooled` event
//! was allocated from an external pool and carries a reference count that
//! tracks every outstanding copy (the publisher's, the dispatcher's
//! in-flight reference, and one per subscriber queue).
//!
//! Events travel through the system as [`EventRef`] (`Arc<Event>`): the
//! `Arc` keeps the memory valid, while the manual count drives the *pool*
//! lifecycle — when it drops to zero, the pool collaborator reclaims the
//! slot. The count is touched only by the
//! [`Lifecycle`](crate::events::Lifecycle) tracker.
//!
//! ## Example
//! ```
//! use sigcast::Event;
//!
//! let tick = Event::immutable(8);
//! assert_eq!(tick.signal(), 8);
//! assert!(!tick.is_pooled());
//!
//! let sample = Event::pooled(9, 2);
//! assert_eq!(sample.pool_id(), Some(2));
//! assert_eq!(sample.ref_count(), 0);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Integer tag identifying an event's meaning.
///
/// Valid signals are `0..max_signal`; signals below [`USER_SIG`] are
/// reserved for the framework and cannot be subscribed to.
pub type Signal = u16;

/// First signal available to applications. Signals `0..USER_SIG` are
/// reserved.
pub const USER_SIG: Signal = 4;

/// Identifier of the pool a pooled event was allocated from.
pub type PoolId = u8;

/// Ownership mode of an event.
#[derive(Debug)]
pub enum Origin {
    /// Static or stack storage; never reference-counted, never reclaimed.
    Static,
    /// Allocated from an external pool; reclaimed when the count hits zero.
    Pooled {
        /// The pool this event came from.
        pool: PoolId,
        /// Outstanding logical references.
        refs: AtomicU8,
    },
}

/// Immutable event header.
#[derive(Debug)]
pub struct Event {
    signal: Signal,
    origin: Origin,
}

/// Shared handle to one event instance.
///
/// Cloning an `EventRef` is the zero-copy step of multicast: every
/// subscriber queue receives a pointer to the same instance.
pub type EventRef = Arc<Event>;

impl Event {
    /// Creates a statically owned event.
    #[must_use]
    pub fn immutable(signal: Signal) -> Self {
        Self {
            signal,
            origin: Origin::Static,
        }
    }

    /// Creates a pool-owned event with a zeroed reference count.
    ///
    /// The count starts at zero because a freshly allocated event has no
    /// holders yet; the allocating side acquires its own reference through
    /// the lifecycle tracker if it intends to keep the event past `publish`.
    #[must_use]
    pub fn pooled(signal: Signal, pool: PoolId) -> Self {
        Self {
            signal,
            origin: Origin::Pooled {
                pool,
                refs: AtomicU8::new(0),
            },
        }
    }

    /// The signal this event carries.
    #[inline]
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// True for pool-owned events.
    #[inline]
    pub fn is_pooled(&self) -> bool {
        matches!(self.origin, Origin::Pooled { .. })
    }

    /// The owning pool, if any.
    #[inline]
    pub fn pool_id(&self) -> Option<PoolId> {
        match &self.origin {
            Origin::Static => None,
            Origin::Pooled { pool, .. } => Some(*pool),
        }
    }

    /// Current reference count; always zero for static events.
    ///
    /// Meaningful for observability and tests, not for control flow — by
    /// the time a caller looks at it, a concurrent release may already have
    /// changed it.
    #[inline]
    pub fn ref_count(&self) -> u8 {
        match &self.origin {
            Origin::Static => 0,
            Origin::Pooled { refs, .. } => refs.load(Ordering::Acquire),
        }
    }

    /// The counter cell, present only on pooled events.
    #[inline]
    pub(crate) fn refs(&self) -> Option<&AtomicU8> {
        match &self.origin {
            Origin::Static => None,
            Origin::Pooled { refs, .. } => Some(refs),
        }
    }
}
