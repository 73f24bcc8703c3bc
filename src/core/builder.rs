use std::sync::Arc;

use crate::config::Config;
use crate::core::Multicaster;
use crate::error::BuildError;
use crate::events::Lifecycle;
use crate::objects::Directory;
use crate::pool::{EventPool, NoPool};
use crate::registry::SubscriptionRegistry;
use crate::sched::{NullScheduler, SchedulerLock};

/// Builder for wiring a [`Multicaster`] with its collaborators.
pub struct MulticasterBuilder {
    config: Config,
    directory: Option<Arc<Directory>>,
    scheduler: Arc<dyn SchedulerLock>,
    pool: Arc<dyn EventPool>,
}

impl MulticasterBuilder {
    /// Creates a new builder with the given configuration.
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            directory: None,
            scheduler: Arc::new(NullScheduler),
            pool: Arc::new(NoPool),
        }
    }

    /// Injects a directory shared with the surrounding runtime.
    ///
    /// Without this, `build()` creates a fresh directory sized to
    /// `max_active`; reach it through
    /// [`Multicaster::directory`](crate::Multicaster::directory).
    pub fn with_directory(mut self, directory: Arc<Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Injects the runtime's priority-ceiling scheduler lock.
    ///
    /// Defaults to [`NullScheduler`] (no preemption source).
    pub fn with_scheduler(mut self, scheduler: Arc<dyn SchedulerLock>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Injects the event-pool reclamation collaborator.
    ///
    /// Defaults to [`NoPool`], which treats any reclamation as a
    /// configuration bug — fine for static-events-only deployments.
    pub fn with_pool(mut self, pool: Arc<dyn EventPool>) -> Self {
        self.pool = pool;
        self
    }

    /// Validates the configuration and assembles the core.
    pub fn build(self) -> Result<Multicaster, BuildError> {
        let registry = SubscriptionRegistry::new(&self.config)?;

        let directory = match self.directory {
            Some(directory) => {
                if directory.capacity() < self.config.max_active {
                    return Err(BuildError::DirectoryTooSmall {
                        capacity: directory.capacity(),
                        max_active: self.config.max_active,
                    });
                }
                directory
            }
            None => Arc::new(Directory::new(self.config.max_active)),
        };

        Ok(Multicaster {
            registry,
            directory,
            scheduler: self.scheduler,
            lifecycle: Lifecycle::new(self.pool),
        })
    }
}

impl Multicaster {
    /// Starts building a core for the given dimensions.
    pub fn builder(config: Config) -> MulticasterBuilder {
        MulticasterBuilder::new(config)
    }
}
