// src/lib.rs

pub mod broker;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod publisher;
pub mod queue;
pub mod scheduler;
pub mod store;
pub mod types;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::broker::ingress::Ingress;
use crate::broker::{Delivery, MessageBus};
use crate::config::SchedulerSettings;
use crate::queue::QueueClient;
use crate::scheduler::Scheduler;
use crate::store::{TaskGraphStore, TaskStore};

/// Handle returned by [`start`].
pub struct SchedulerHandle {
    /// The broker adapter feeds deliveries in here. Dropping it (and every
    /// clone) stops the ingress after in-flight handlers drain.
    pub delivery_tx: mpsc::Sender<Delivery>,

    /// The running consume loop; await it during shutdown.
    pub ingress: tokio::task::JoinHandle<errors::Result<()>>,

    /// The shared dependency record, for diagnostics and tests.
    pub scheduler: Arc<Scheduler>,
}

/// High-level wiring entry used by the embedding service.
///
/// This ties together:
/// - the settings (scheduler id, exchange names, channel capacity)
/// - the injected store, queue and bus adapters
/// - the ingress loop, spawned onto the current runtime
pub fn start(
    settings: &SchedulerSettings,
    tasks: Arc<dyn TaskStore>,
    graphs: Arc<dyn TaskGraphStore>,
    queue: Arc<dyn QueueClient>,
    bus: Arc<dyn MessageBus>,
) -> SchedulerHandle {
    let scheduler = Arc::new(Scheduler::new(settings, tasks, graphs, queue, bus));

    let (delivery_tx, delivery_rx) = mpsc::channel::<Delivery>(settings.channel_capacity);

    info!(scheduler_id = %scheduler.scheduler_id(), "starting graphsched");

    let ingress = Ingress::new(Arc::clone(&scheduler), delivery_rx);
    let ingress = tokio::spawn(ingress.run());

    SchedulerHandle {
        delivery_tx,
        ingress,
        scheduler,
    }
}
