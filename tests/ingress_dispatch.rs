// tests/ingress_dispatch.rs

//! End-to-end ingress tests: deliveries go in, dispositions come out, and
//! the entity stores / fake queue reflect the handled events.

mod common;
use crate::common::{harness, Harness, SCHEDULER_ID};

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use graphsched::broker::{AckDisposition, Delivery, TASK_COMPLETED_EXCHANGE, TASK_FAILED_EXCHANGE};
use graphsched::broker::Ingress;
use graphsched::graph::entity::GraphState;
use graphsched_test_utils::builders::{TaskBuilder, TaskGraphBuilder};
use graphsched_test_utils::wire::{completed_payload, delivery, failed_payload};

type TestResult = Result<(), Box<dyn Error>>;

/// Spawn an ingress over the harness scheduler and return the feed channel
/// plus its join handle.
fn spawn_ingress(
    h: &Harness,
) -> (
    mpsc::Sender<Delivery>,
    tokio::task::JoinHandle<graphsched::errors::Result<()>>,
) {
    let (tx, rx) = mpsc::channel::<Delivery>(16);
    let ingress = Ingress::new(Arc::clone(&h.scheduler), rx);
    (tx, tokio::spawn(ingress.run()))
}

async fn send(
    tx: &mpsc::Sender<Delivery>,
    exchange: &str,
    routing_key: &str,
    payload: serde_json::Value,
) -> AckDisposition {
    let (d, disposition) = delivery(exchange, routing_key, payload);
    tx.send(d).await.expect("ingress alive");
    timeout(Duration::from_secs(3), disposition)
        .await
        .expect("disposition within 3 seconds")
        .expect("disposition settled")
}

#[tokio::test]
async fn completion_is_acked_and_applied() -> TestResult {
    let h = harness();
    TaskGraphBuilder::new("g-1")
        .with_task(TaskBuilder::new("g-1", "A").build())
        .with_task(TaskBuilder::new("g-1", "B").requires("A").build())
        .build(&h.tasks, &h.graphs);

    let (tx, ingress) = spawn_ingress(&h);

    let disposition = send(
        &tx,
        TASK_COMPLETED_EXCHANGE,
        &format!("{SCHEDULER_ID}.g-1"),
        completed_payload("A", true),
    )
    .await;

    assert_eq!(disposition, AckDisposition::Ack);
    assert!(h.tasks.get("g-1", "A").unwrap().succeeded());
    assert_eq!(h.queue.scheduled(), vec!["B".to_string()]);

    drop(tx);
    timeout(Duration::from_secs(3), ingress).await???;
    Ok(())
}

#[tokio::test]
async fn hard_failure_is_acked_and_blocks() -> TestResult {
    let h = harness();
    TaskGraphBuilder::new("g-2")
        .with_task(TaskBuilder::new("g-2", "T").build())
        .build(&h.tasks, &h.graphs);

    let (tx, ingress) = spawn_ingress(&h);

    let disposition = send(
        &tx,
        TASK_FAILED_EXCHANGE,
        &format!("{SCHEDULER_ID}.g-2"),
        failed_payload("T"),
    )
    .await;

    assert_eq!(disposition, AckDisposition::Ack);
    assert_eq!(h.graphs.get("g-2").unwrap().state, GraphState::Blocked);

    drop(tx);
    timeout(Duration::from_secs(3), ingress).await???;
    Ok(())
}

/// A message from an exchange this scheduler never bound to is a
/// programming error: rejected, never silently dropped or requeued.
#[tokio::test]
async fn unexpected_exchange_is_rejected() -> TestResult {
    let h = harness();
    let (tx, _ingress) = spawn_ingress(&h);

    let disposition = send(
        &tx,
        "task-defined",
        &format!("{SCHEDULER_ID}.g-1"),
        completed_payload("A", true),
    )
    .await;

    assert_eq!(disposition, AckDisposition::Reject);
    Ok(())
}

#[tokio::test]
async fn malformed_routing_key_is_rejected() -> TestResult {
    let h = harness();
    let (tx, _ingress) = spawn_ingress(&h);

    let trailing_empty_segment = format!("{SCHEDULER_ID}.");
    for routing_key in ["g-1", "other-scheduler.g-1", trailing_empty_segment.as_str()] {
        let disposition = send(
            &tx,
            TASK_COMPLETED_EXCHANGE,
            routing_key,
            completed_payload("A", true),
        )
        .await;
        assert_eq!(disposition, AckDisposition::Reject, "key: {routing_key}");
    }
    Ok(())
}

#[tokio::test]
async fn malformed_payload_is_rejected() -> TestResult {
    let h = harness();
    let (tx, _ingress) = spawn_ingress(&h);

    // Missing the required `success` field.
    let disposition = send(
        &tx,
        TASK_COMPLETED_EXCHANGE,
        &format!("{SCHEDULER_ID}.g-1"),
        serde_json::json!({ "status": { "taskId": "A" } }),
    )
    .await;

    assert_eq!(disposition, AckDisposition::Reject);
    Ok(())
}

/// A transient queue failure nacks the delivery for redelivery; the replay
/// succeeds and lands on already-committed, unchanged entity state.
#[tokio::test]
async fn transient_queue_failure_requeues_then_succeeds() -> TestResult {
    let h = harness();
    TaskGraphBuilder::new("g-3")
        .with_task(TaskBuilder::new("g-3", "A").build())
        .with_task(TaskBuilder::new("g-3", "B").requires("A").build())
        .build(&h.tasks, &h.graphs);

    let (tx, _ingress) = spawn_ingress(&h);
    h.queue.fail_next_requests(1);

    let routing_key = format!("{SCHEDULER_ID}.g-3");
    let first = send(
        &tx,
        TASK_COMPLETED_EXCHANGE,
        &routing_key,
        completed_payload("A", true),
    )
    .await;
    assert_eq!(first, AckDisposition::Requeue);
    assert!(
        h.tasks.get("g-3", "A").unwrap().succeeded(),
        "resolution committed before the failing RPC"
    );

    let second = send(
        &tx,
        TASK_COMPLETED_EXCHANGE,
        &routing_key,
        completed_payload("A", true),
    )
    .await;
    assert_eq!(second, AckDisposition::Ack);
    assert_eq!(h.queue.scheduled(), vec!["B".to_string()]);

    Ok(())
}

/// Closing the delivery channel stops the loop after draining in-flight
/// handlers.
#[tokio::test]
async fn channel_close_drains_and_exits() -> TestResult {
    let h = harness();
    let (tx, ingress) = spawn_ingress(&h);

    drop(tx);
    timeout(Duration::from_secs(3), ingress).await???;
    Ok(())
}

/// The `start` entry wires settings + adapters into a running ingress.
#[tokio::test]
async fn start_wires_scheduler_end_to_end() -> TestResult {
    let h = harness();
    TaskGraphBuilder::new("g-4")
        .with_task(TaskBuilder::new("g-4", "only").build())
        .build(&h.tasks, &h.graphs);

    let settings = graphsched::config::SchedulerSettings::new(SCHEDULER_ID);
    let handle = graphsched::start(
        &settings,
        Arc::new(h.tasks.clone()),
        Arc::new(h.graphs.clone()),
        Arc::new(h.queue.clone()),
        Arc::new(h.bus.clone()),
    );

    let disposition = send(
        &handle.delivery_tx,
        TASK_COMPLETED_EXCHANGE,
        &format!("{SCHEDULER_ID}.g-4"),
        completed_payload("only", true),
    )
    .await;

    assert_eq!(disposition, AckDisposition::Ack);
    assert_eq!(h.graphs.get("g-4").unwrap().state, GraphState::Finished);
    assert_eq!(
        h.bus
            .published_on(graphsched::broker::TASK_GRAPH_FINISHED_EXCHANGE)
            .len(),
        1
    );

    drop(handle.delivery_tx);
    timeout(Duration::from_secs(3), handle.ingress).await???;
    Ok(())
}
