// tests/property/progression.rs

//! Property test: on a random DAG where every task eventually succeeds, the
//! graph finishes exactly once and every task with prerequisites is
//! scheduled exactly once.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use graphsched::broker::{MemoryBus, TASK_GRAPH_FINISHED_EXCHANGE};
use graphsched::config::SchedulerSettings;
use graphsched::dispatch::{dispatch, QueueEvent};
use graphsched::graph::entity::GraphState;
use graphsched::scheduler::Scheduler;
use graphsched::store::{MemoryTaskGraphStore, MemoryTaskStore};
use graphsched_test_utils::builders::{TaskBuilder, TaskGraphBuilder};
use graphsched_test_utils::FakeQueue;

/// Random dependency lists: task N may only depend on tasks 0..N, so the
/// graph is acyclic and index order is a valid completion order.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
    })
}

/// Sanitized prerequisite indices for task `i`: only indices below `i`.
fn sanitize_deps(i: usize, potential_deps: &[usize]) -> HashSet<usize> {
    let mut valid = HashSet::new();
    for dep_idx in potential_deps {
        if i > 0 {
            valid.insert(dep_idx % i);
        }
    }
    valid
}

struct Outcome {
    state: GraphState,
    requires_left: usize,
    finished_events: usize,
    scheduled: Vec<String>,
}

fn run_to_completion(raw_deps: &[Vec<usize>]) -> Outcome {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime builds");

    rt.block_on(async {
        let tasks = MemoryTaskStore::new();
        let graphs = MemoryTaskGraphStore::new();
        let queue = FakeQueue::new();
        let bus = MemoryBus::new();
        let scheduler = Scheduler::new(
            &SchedulerSettings::new("sched-1"),
            Arc::new(tasks.clone()),
            Arc::new(graphs.clone()),
            Arc::new(queue.clone()),
            Arc::new(bus.clone()),
        );

        let mut builder = TaskGraphBuilder::new("g-prop");
        for (i, potential_deps) in raw_deps.iter().enumerate() {
            let mut task = TaskBuilder::new("g-prop", &format!("task_{i}"));
            for dep_idx in sanitize_deps(i, potential_deps) {
                task = task.requires(&format!("task_{dep_idx}"));
            }
            builder = builder.with_task(task.build());
        }
        builder.build(&tasks, &graphs);

        // Every task completes successfully, in dependency order.
        for i in 0..raw_deps.len() {
            dispatch(
                &scheduler,
                QueueEvent::TaskCompleted {
                    task_graph_id: "g-prop".to_string(),
                    task_id: format!("task_{i}"),
                    success: true,
                    result_url: None,
                    logs_url: None,
                },
            )
            .await
            .expect("handler succeeds");
        }

        let stored = graphs.get("g-prop").expect("graph exists");
        Outcome {
            state: stored.state,
            requires_left: stored.requires_left.len(),
            finished_events: bus.published_on(TASK_GRAPH_FINISHED_EXCHANGE).len(),
            scheduled: queue.scheduled(),
        }
    })
}

proptest! {
    #[test]
    fn all_successes_finish_the_graph_exactly_once(raw_deps in dag_strategy(8)) {
        // A task is scheduled by the engine exactly when its last
        // prerequisite succeeds, so the expected set is every task that has
        // prerequisites at all.
        let mut expected: Vec<String> = raw_deps
            .iter()
            .enumerate()
            .filter(|(i, potential_deps)| !sanitize_deps(*i, potential_deps).is_empty())
            .map(|(i, _)| format!("task_{i}"))
            .collect();
        expected.sort();

        let outcome = run_to_completion(&raw_deps);

        prop_assert_eq!(outcome.state, GraphState::Finished);
        prop_assert_eq!(outcome.requires_left, 0);
        prop_assert_eq!(outcome.finished_events, 1);

        let mut scheduled = outcome.scheduled;
        scheduled.sort();
        prop_assert_eq!(scheduled, expected);
    }
}
