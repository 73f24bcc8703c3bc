//! # Multicast Demo
//!
//! Wires three queue-owning active objects into a `Multicaster`, subscribes
//! them to overlapping signals, and publishes a few events — one static,
//! one pool-owned — printing the delivery order and the reference-count
//! trail.
//!
//! ## Run
//! ```bash
//! RUST_LOG=trace cargo run --example multicast
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use sigcast::{
    ActiveObject, Config, Event, EventPool, EventRef, Multicaster, Priority, QueueFull, USER_SIG,
};

const SIG_TICK: u16 = USER_SIG;
const SIG_SAMPLE: u16 = USER_SIG + 1;

/// An active object with a bounded in-memory queue.
struct Worker {
    label: &'static str,
    priority: Priority,
    queue: Mutex<Vec<EventRef>>,
}

impl Worker {
    fn new(label: &'static str, priority: Priority) -> Arc<Self> {
        Arc::new(Self {
            label,
            priority,
            queue: Mutex::new(Vec::new()),
        })
    }

    /// Run-to-completion pass over everything queued so far.
    fn drain(&self, cast: &Multicaster) {
        for event in self.queue.lock().drain(..) {
            println!(
                " ├─► {} (prio {}) processed signal {}",
                self.label,
                self.priority,
                event.signal()
            );
            cast.lifecycle().release(&event);
        }
    }
}

impl ActiveObject for Worker {
    fn priority(&self) -> Priority {
        self.priority
    }

    fn post(&self, event: EventRef) -> Result<(), QueueFull> {
        let mut queue = self.queue.lock();
        if queue.len() >= 8 {
            return Err(QueueFull);
        }
        println!(
            " ├─► {} (prio {}) queued signal {}",
            self.label,
            self.priority,
            event.signal()
        );
        queue.push(event);
        Ok(())
    }

    fn name(&self) -> &'static str {
        self.label
    }
}

/// Prints instead of returning slots to a real allocator.
struct PrintingPool;

impl EventPool for PrintingPool {
    fn reclaim(&self, event: &EventRef) {
        println!(" └─► pool reclaimed signal {}", event.signal());
    }
}

fn main() -> Result<(), sigcast::BuildError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cast = Multicaster::builder(Config {
        max_signal: 16,
        max_active: 8,
    })
    .with_pool(Arc::new(PrintingPool))
    .build()?;

    let sensor = Worker::new("sensor", 6);
    let filter = Worker::new("filter", 4);
    let logger = Worker::new("logger", 1);

    for worker in [&sensor, &filter, &logger] {
        let object: Arc<dyn ActiveObject> = worker.clone();
        cast.directory().register(object.clone());
        cast.subscribe(&object, SIG_TICK);
    }
    let filter_object: Arc<dyn ActiveObject> = filter.clone();
    cast.subscribe(&filter_object, SIG_SAMPLE);

    println!("publish tick (static, three subscribers, ceiling 6):");
    cast.publish(&Arc::new(Event::immutable(SIG_TICK)), "demo");

    println!("publish sample (pooled, one subscriber):");
    cast.publish(&Arc::new(Event::pooled(SIG_SAMPLE, 1)), "demo");

    println!("drain queues:");
    sensor.drain(&cast);
    filter.drain(&cast);
    logger.drain(&cast);

    println!("publish sample again (pooled, after unsubscribe — reclaimed at once):");
    cast.unsubscribe(&filter_object, SIG_SAMPLE);
    cast.publish(&Arc::new(Event::pooled(SIG_SAMPLE, 1)), "demo");

    Ok(())
}
