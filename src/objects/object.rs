//! # Active-object contract.
//!
//! `ActiveObject` is the boundary between this core and the surrounding
//! runtime's scheduled units. The dispatcher never runs an object; it only
//! resolves handles through the [`Directory`](crate::objects::Directory)
//! and hands events to their queues.
//!
//! ## Contract
//! - [`ActiveObject::priority`] is stable for the lifetime of the
//!   registration and unique across the directory.
//! - [`ActiveObject::post`] enqueues in FIFO order and returns
//!   `Err(QueueFull)` on capacity overflow — the dispatcher converts that
//!   into the fatal queue-overflow contract; implementations must not drop
//!   events silently.
//! - For a pooled event the dispatcher has already acquired the queue's
//!   reference before posting; the consumer releases it (via
//!   [`Lifecycle::release`](crate::events::Lifecycle::release)) once the
//!   event has been processed.

use crate::events::EventRef;

/// Integer in `1..=max_active` uniquely identifying one active object.
/// Higher value means higher scheduling priority.
pub type Priority = u8;

/// Returned by [`ActiveObject::post`] when the target queue is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

/// Contract for a priority-ranked, independently scheduled unit with its
/// own FIFO event queue.
pub trait ActiveObject: Send + Sync {
    /// This object's unique priority.
    fn priority(&self) -> Priority;

    /// Appends one event to this object's queue (FIFO).
    ///
    /// Delivery is asynchronous from the receiver's perspective: returning
    /// `Ok` means the queue accepted the event, not that it was processed.
    fn post(&self, event: EventRef) -> Result<(), QueueFull>;

    /// Human-readable name (for trace records).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
