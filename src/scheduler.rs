// src/scheduler.rs

//! Shared dependency record for the scheduler.
//!
//! All collaborators are supplied once at startup and immutable afterwards;
//! the record is shared across in-flight handlers behind an `Arc`. There is
//! no process-wide state beyond this.

use std::sync::Arc;

use crate::broker::MessageBus;
use crate::config::SchedulerSettings;
use crate::publisher::LifecyclePublisher;
use crate::queue::QueueClient;
use crate::store::{TaskGraphStore, TaskStore};

/// The scheduler: its identity plus the adapters the handlers act through.
pub struct Scheduler {
    scheduler_id: String,
    pub(crate) task_completed_exchange: String,
    pub(crate) task_failed_exchange: String,
    pub(crate) tasks: Arc<dyn TaskStore>,
    pub(crate) graphs: Arc<dyn TaskGraphStore>,
    pub(crate) queue: Arc<dyn QueueClient>,
    pub(crate) publisher: LifecyclePublisher,
}

impl Scheduler {
    pub fn new(
        settings: &SchedulerSettings,
        tasks: Arc<dyn TaskStore>,
        graphs: Arc<dyn TaskGraphStore>,
        queue: Arc<dyn QueueClient>,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        let publisher = LifecyclePublisher::new(
            bus,
            settings.exchanges.task_graph_blocked.clone(),
            settings.exchanges.task_graph_finished.clone(),
        );

        Self {
            scheduler_id: settings.scheduler_id.clone(),
            task_completed_exchange: settings.exchanges.task_completed.clone(),
            task_failed_exchange: settings.exchanges.task_failed.clone(),
            tasks,
            graphs,
            queue,
            publisher,
        }
    }

    /// Identifier inbound routing keys are filtered by.
    pub fn scheduler_id(&self) -> &str {
        &self.scheduler_id
    }
}
