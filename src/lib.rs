//! # sigcast
//!
//! **sigcast** is the publish-subscribe multicast core of a priority-based
//! active-object runtime.
//!
//! It routes one published event to every active object subscribed to that
//! event's signal — in strictly descending priority order, safely from
//! interrupt-like contexts, without copying the payload, and without
//! stalling work above the highest subscriber's priority. The crate is
//! designed as a building block: the scheduler, the per-object queues, and
//! the event pool stay outside, behind small collaborator traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                      publish(event, sender)
//!                               │
//!            ┌──────────────────▼───────────────────┐
//!            │ Multicaster                          │
//!            │   SubscriptionRegistry               │
//!            │     signal → SubscriberMask          │
//!            │   Lifecycle (manual refcount)        │
//!            └───┬───────────────┬──────────────┬───┘
//!                │               │              │
//!       lock(ceiling)      resolve(prio)    reclaim(event)
//!                │               │              │
//!                ▼               ▼              ▼
//!        ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!        │SchedulerLock │ │  Directory   │ │  EventPool   │
//!        │(collaborator)│ │ prio → AO    │ │(collaborator)│
//!        └──────────────┘ └──────┬───────┘ └──────────────┘
//!                                │ post(event)  — descending priority
//!                     ┌──────────┼──────────┐
//!                     ▼          ▼          ▼
//!                ┌────────┐ ┌────────┐ ┌────────┐
//!                │ AO p=7 │ │ AO p=5 │ │ AO p=2 │
//!                │ queue  │ │ queue  │ │ queue  │
//!                └────────┘ └────────┘ └────────┘
//! ```
//!
//! ### One publish call
//! ```text
//! publish(event, sender)
//!   ├─► signal range check                       (fatal on violation)
//!   ├─► acquire in-flight reference              (pooled events only)
//!   ├─► scan subscriber mask, highest bit first:
//!   │     first bit  ──► scheduler.lock(ceiling = that priority)
//!   │     every bit  ──► directory.resolve ──► acquire ──► post
//!   ├─► scheduler.unlock
//!   └─► release in-flight reference  ──► reclaim if nobody else holds one
//! ```
//!
//! Objects strictly above the ceiling keep preempting during the scan;
//! objects at or below it cannot run — and so cannot publish and interleave
//! — until the multicast completes. That is what makes queue-arrival order
//! match publish-call order at every shared subscriber.
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                        |
//! |-------------------|-------------------------------------------------------------------|-------------------------------------------|
//! | **Subscriptions** | Signal-indexed bitmask table, set/clear under one atomic each.    | [`SubscriptionRegistry`], [`SubscriberMask`] |
//! | **Dispatch**      | Descending-priority multicast with priority-ceiling locking.      | [`Multicaster`]                           |
//! | **Lifecycle**     | Manual refcount keeping one event valid across all consumers.     | [`Lifecycle`], [`InFlight`], [`Event`]    |
//! | **Consumers**     | Queue-owning objects resolved through a priority directory.       | [`ActiveObject`], [`Directory`]           |
//! | **Collaborators** | Scheduler lock and pool reclamation stay outside the core.        | [`SchedulerLock`], [`EventPool`]          |
//! | **Contracts**     | Every runtime fault is fatal, routed through one handler.         | [`Violation`], [`fault`]                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use sigcast::{
//!     ActiveObject, Config, Event, EventRef, Multicaster, Priority, QueueFull, USER_SIG,
//! };
//!
//! struct Blinky {
//!     priority: Priority,
//! }
//!
//! impl ActiveObject for Blinky {
//!     fn priority(&self) -> Priority {
//!         self.priority
//!     }
//!     fn post(&self, event: EventRef) -> Result<(), QueueFull> {
//!         println!("prio {} <- signal {}", self.priority, event.signal());
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), sigcast::BuildError> {
//!     let cast = Multicaster::builder(Config::default()).build()?;
//!
//!     let blinky: Arc<dyn ActiveObject> = Arc::new(Blinky { priority: 3 });
//!     cast.directory().register(blinky.clone());
//!     cast.subscribe(&blinky, USER_SIG);
//!
//!     cast.publish(&Arc::new(Event::immutable(USER_SIG)), "main");
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
pub mod fault;
mod objects;
mod pool;
mod registry;
mod sched;

// ---- Public re-exports ----

pub use self::core::{Multicaster, MulticasterBuilder};
pub use config::Config;
pub use error::BuildError;
pub use events::{Event, EventRef, InFlight, Lifecycle, Origin, PoolId, Signal, USER_SIG};
pub use fault::{set_fatal_handler, FatalHandler, Violation};
pub use objects::{ActiveObject, Directory, Priority, QueueFull};
pub use pool::{EventPool, NoPool};
pub use registry::{Descending, SubscriberMask, SubscriptionRegistry};
pub use sched::{NullScheduler, SchedToken, SchedulerLock};
