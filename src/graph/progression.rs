// src/graph/progression.rs

//! The progression engine: advances a task-graph in response to queue
//! notifications.
//!
//! Every state change goes through the stores' `modify`, and every
//! did-this-transition-happen flag is re-initialised at the top of the
//! mutator body so that CAS replays settle on the winning attempt's answer.
//! Reruns, dependent scheduling and lifecycle publications all happen
//! strictly after the corresponding commit.

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::graph::entity::{GraphState, Resolution, TaskEntity};
use crate::scheduler::Scheduler;

/// Success path: record the resolution, then either schedule dependents or,
/// when the task is a leaf, run the graph-finish check.
pub async fn handle_task_success(
    scheduler: &Scheduler,
    task_graph_id: &str,
    task_id: &str,
    result_url: Option<String>,
    logs_url: Option<String>,
) -> Result<()> {
    let task = scheduler
        .tasks
        .modify(task_graph_id, task_id, &mut |task| {
            // A resolution is never overwritten; a duplicate delivery
            // leaves the committed record untouched.
            if task.resolution.is_none() {
                task.resolution = Some(Resolution {
                    completed: true,
                    success: true,
                    result_url: result_url.clone(),
                    logs_url: logs_url.clone(),
                });
            }
        })
        .await?;

    debug!(graph = %task_graph_id, task = %task_id, "task succeeded");

    if task.is_leaf() {
        check_graph_finished(scheduler, task_graph_id, task_id).await
    } else {
        schedule_ready_dependents(scheduler, &task).await
    }
}

/// Soft failure (`completed` with `success: false`): consume a rerun if
/// budget remains, otherwise resolve the task and block the graph.
pub async fn handle_task_soft_failure(
    scheduler: &Scheduler,
    task_graph_id: &str,
    task_id: &str,
    result_url: Option<String>,
    logs_url: Option<String>,
) -> Result<()> {
    let mut rerun_available = false;

    scheduler
        .tasks
        .modify(task_graph_id, task_id, &mut |task| {
            // Replayed attempts must not inherit a stale answer.
            rerun_available = false;

            if task.resolution.is_some() {
                return;
            }

            if task.reruns_left > 0 {
                task.reruns_left -= 1;
                rerun_available = true;
            } else {
                task.resolution = Some(Resolution {
                    completed: true,
                    success: false,
                    result_url: result_url.clone(),
                    logs_url: logs_url.clone(),
                });
            }
        })
        .await?;

    if rerun_available {
        info!(graph = %task_graph_id, task = %task_id, "soft failure; requesting rerun");
        scheduler.queue.rerun_task(task_id).await?;
        return Ok(());
    }

    warn!(
        graph = %task_graph_id,
        task = %task_id,
        "soft failure with no reruns left; blocking graph"
    );
    block_task_graph(scheduler, task_graph_id, task_id).await
}

/// Hard failure (`task-failed`): the queue already exhausted its own
/// retries, so no rerun is requested. Resolve the task and block the graph.
pub async fn handle_task_hard_failure(
    scheduler: &Scheduler,
    task_graph_id: &str,
    task_id: &str,
) -> Result<()> {
    scheduler
        .tasks
        .modify(task_graph_id, task_id, &mut |task| {
            if task.resolution.is_none() {
                task.resolution = Some(Resolution {
                    completed: false,
                    success: false,
                    result_url: None,
                    logs_url: None,
                });
            }
        })
        .await?;

    warn!(
        graph = %task_graph_id,
        task = %task_id,
        "task failed after queue retries; blocking graph"
    );
    block_task_graph(scheduler, task_graph_id, task_id).await
}

/// Schedule every dependent of `task` whose prerequisites have all
/// succeeded.
///
/// The queue guarantees at-most-once scheduling per task id, so this may
/// race with another handler scheduling the same dependent and still be
/// safe.
async fn schedule_ready_dependents(scheduler: &Scheduler, task: &TaskEntity) -> Result<()> {
    for dependent_id in &task.dependents {
        let dependent = scheduler
            .tasks
            .load(&task.task_graph_id, dependent_id)
            .await?;

        if dependent.is_resolved() {
            continue;
        }

        let mut ready = true;
        for required_id in &dependent.requires {
            let required = scheduler
                .tasks
                .load(&task.task_graph_id, required_id)
                .await?;
            if !required.succeeded() {
                debug!(
                    graph = %task.task_graph_id,
                    task = %dependent_id,
                    waiting_on = %required_id,
                    "dependent not ready yet"
                );
                ready = false;
                break;
            }
        }

        if ready {
            info!(
                graph = %task.task_graph_id,
                task = %dependent_id,
                "all prerequisites succeeded; scheduling dependent"
            );
            scheduler
                .queue
                .schedule_task(dependent_id, &dependent.definition)
                .await?;
        }
    }

    Ok(())
}

/// Remove a just-succeeded leaf from `requires_left` and finish the graph
/// when nothing is left.
///
/// The publication happens after the commit: the mutator may run several
/// times under conflict, and only the winning attempt's `finished_now` may
/// fire the event.
async fn check_graph_finished(
    scheduler: &Scheduler,
    task_graph_id: &str,
    task_id: &str,
) -> Result<()> {
    let mut finished_now = false;

    let graph = scheduler
        .graphs
        .modify(task_graph_id, &mut |graph| {
            finished_now = false;

            if !graph.requires_left.remove(task_id) {
                return;
            }

            // `blocked` is terminal; an emptied requires_left on a blocked
            // graph must not resurrect it.
            if graph.requires_left.is_empty() && !graph.state.is_terminal() {
                graph.state = GraphState::Finished;
                finished_now = true;
            }
        })
        .await?;

    if finished_now {
        info!(graph = %task_graph_id, "all leaf tasks succeeded; task-graph finished");
        scheduler.publisher.task_graph_finished(&graph).await?;
    }

    Ok(())
}

/// Transition the graph to `blocked` and publish the event, once per
/// running → blocked transition. A graph already terminal stays untouched
/// and publishes nothing.
async fn block_task_graph(
    scheduler: &Scheduler,
    task_graph_id: &str,
    blocking_task_id: &str,
) -> Result<()> {
    let mut was_running = false;

    let graph = scheduler
        .graphs
        .modify(task_graph_id, &mut |graph| {
            was_running = !graph.state.is_terminal();
            if was_running {
                graph.state = GraphState::Blocked;
            }
        })
        .await?;

    if was_running {
        info!(
            graph = %task_graph_id,
            task = %blocking_task_id,
            "task-graph blocked"
        );
        scheduler
            .publisher
            .task_graph_blocked(&graph, blocking_task_id)
            .await?;
    } else {
        debug!(
            graph = %task_graph_id,
            task = %blocking_task_id,
            "graph already terminal; block is a no-op"
        );
    }

    Ok(())
}
