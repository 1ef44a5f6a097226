// src/broker/messages.rs

//! Payload schemas for the exchanges this scheduler consumes and publishes.
//!
//! Field names are camelCase on the wire, matching the submission API's JSON
//! schema.

use serde::{Deserialize, Serialize};

use crate::graph::entity::TaskGraphStatus;

/// Task status block embedded in queue notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub task_id: String,

    /// Dotted routing value assigned at submission; segment 1 is the graph
    /// id. Carried in the payload as well as the delivery routing key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

/// `task-completed` payload. `success: false` is a soft failure for which
/// this scheduler owns the rerun budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedMessage {
    pub status: TaskStatus,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_url: Option<String>,
}

/// `task-failed` payload: the execution queue exhausted its own retry
/// budget, so no rerun is requested here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailedMessage {
    pub status: TaskStatus,
}

/// `task-graph-blocked` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGraphBlockedMessage {
    pub status: TaskGraphStatus,

    /// The task whose non-recoverable failure blocked the graph.
    pub task_id: String,
}

/// `task-graph-finished` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGraphFinishedMessage {
    pub status: TaskGraphStatus,
}
