#![allow(dead_code)]

use std::sync::Arc;

use graphsched::broker::MemoryBus;
use graphsched::config::SchedulerSettings;
use graphsched::scheduler::Scheduler;
use graphsched::store::{MemoryTaskGraphStore, MemoryTaskStore};
use graphsched_test_utils::FakeQueue;

pub use graphsched_test_utils::init_tracing;

/// Scheduler id used by every test graph.
pub const SCHEDULER_ID: &str = "sched-1";

/// A fully wired scheduler over memory adapters, with direct handles on the
/// fakes for assertions.
pub struct Harness {
    pub scheduler: Arc<Scheduler>,
    pub tasks: MemoryTaskStore,
    pub graphs: MemoryTaskGraphStore,
    pub queue: FakeQueue,
    pub bus: MemoryBus,
}

pub fn harness() -> Harness {
    init_tracing();

    let tasks = MemoryTaskStore::new();
    let graphs = MemoryTaskGraphStore::new();
    let queue = FakeQueue::new();
    let bus = MemoryBus::new();

    let settings = SchedulerSettings::new(SCHEDULER_ID);
    let scheduler = Arc::new(Scheduler::new(
        &settings,
        Arc::new(tasks.clone()),
        Arc::new(graphs.clone()),
        Arc::new(queue.clone()),
        Arc::new(bus.clone()),
    ));

    Harness {
        scheduler,
        tasks,
        graphs,
        queue,
        bus,
    }
}
