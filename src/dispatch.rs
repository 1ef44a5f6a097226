// src/dispatch.rs

//! Routing of inbound queue notifications to the progression engine.
//!
//! [`parse_delivery`] turns a raw delivery into a typed [`QueueEvent`],
//! validating the scheduler-id prefix and the dotted routing key;
//! [`dispatch`] routes the event to the matching progression path:
//! successful completions to dependent scheduling / graph finish,
//! unsuccessful completions to the rerun-or-block path, and hard failures
//! straight to the block path.

use crate::broker::messages::{TaskCompletedMessage, TaskFailedMessage};
use crate::errors::{GraphschedError, Result};
use crate::graph::progression;
use crate::scheduler::Scheduler;
use crate::types::{TaskGraphId, TaskId};

/// Parsed inbound event, ready for the progression engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    TaskCompleted {
        task_graph_id: TaskGraphId,
        task_id: TaskId,
        success: bool,
        result_url: Option<String>,
        logs_url: Option<String>,
    },
    TaskFailed {
        task_graph_id: TaskGraphId,
        task_id: TaskId,
    },
}

/// Parse one raw delivery into a [`QueueEvent`].
///
/// The routing key is a trusted-input contract from the submission API:
/// `<scheduler_id>.<task_graph_id>[.…]`. Anything else is a protocol
/// violation and is surfaced, never guessed around. Likewise a message from
/// an exchange this scheduler did not bind to is a programming error, not
/// something to drop silently.
pub fn parse_delivery(
    scheduler: &Scheduler,
    exchange: &str,
    routing_key: &str,
    payload: &[u8],
) -> Result<QueueEvent> {
    let task_graph_id = graph_id_from_routing_key(scheduler.scheduler_id(), routing_key)?;

    if exchange == scheduler.task_completed_exchange {
        let message: TaskCompletedMessage = serde_json::from_slice(payload)?;
        Ok(QueueEvent::TaskCompleted {
            task_graph_id,
            task_id: message.status.task_id,
            success: message.success,
            result_url: message.result_url,
            logs_url: message.logs_url,
        })
    } else if exchange == scheduler.task_failed_exchange {
        let message: TaskFailedMessage = serde_json::from_slice(payload)?;
        Ok(QueueEvent::TaskFailed {
            task_graph_id,
            task_id: message.status.task_id,
        })
    } else {
        Err(GraphschedError::UnexpectedExchange(exchange.to_string()))
    }
}

/// Extract the graph id from segment 1 of the dotted routing key, checking
/// the scheduler-id prefix at segment 0.
fn graph_id_from_routing_key(scheduler_id: &str, routing_key: &str) -> Result<TaskGraphId> {
    let mut segments = routing_key.split('.');
    match (segments.next(), segments.next()) {
        (Some(prefix), Some(graph_id)) if prefix == scheduler_id && !graph_id.is_empty() => {
            Ok(graph_id.to_string())
        }
        _ => Err(GraphschedError::MalformedRoutingKey(
            routing_key.to_string(),
        )),
    }
}

/// Route a parsed event to the matching progression path.
pub async fn dispatch(scheduler: &Scheduler, event: QueueEvent) -> Result<()> {
    match event {
        QueueEvent::TaskCompleted {
            task_graph_id,
            task_id,
            success: true,
            result_url,
            logs_url,
        } => {
            progression::handle_task_success(
                scheduler,
                &task_graph_id,
                &task_id,
                result_url,
                logs_url,
            )
            .await
        }
        QueueEvent::TaskCompleted {
            task_graph_id,
            task_id,
            success: false,
            result_url,
            logs_url,
        } => {
            progression::handle_task_soft_failure(
                scheduler,
                &task_graph_id,
                &task_id,
                result_url,
                logs_url,
            )
            .await
        }
        QueueEvent::TaskFailed {
            task_graph_id,
            task_id,
        } => progression::handle_task_hard_failure(scheduler, &task_graph_id, &task_id).await,
    }
}
