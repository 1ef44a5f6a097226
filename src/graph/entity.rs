// src/graph/entity.rs

//! Durable entity records for tasks and task-graphs.
//!
//! Both families live in the external store as JSON documents with camelCase
//! field names, matching the submission API's schema.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{TaskGraphId, TaskId};

/// Lifecycle state of a task-graph.
///
/// `blocked` and `finished` are terminal: a graph never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphState {
    Running,
    Blocked,
    Finished,
}

impl GraphState {
    pub fn is_terminal(self) -> bool {
        matches!(self, GraphState::Blocked | GraphState::Finished)
    }
}

/// Terminal outcome record of a task. Its presence marks the task as no
/// longer live; once set it is never unset or changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Whether the execution queue actually ran the task to completion.
    /// A post-retry-exhaustion failure reports `completed: false`.
    pub completed: bool,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs_url: Option<String>,
}

/// Durable record of one task within a graph.
///
/// Created at graph submission; the dependency edges (`dependents`,
/// `requires`) are immutable afterwards. Only `reruns_left` and
/// `resolution` change over the task's life.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntity {
    pub task_graph_id: TaskGraphId,
    pub task_id: TaskId,

    /// Remaining scheduler-owned rerun budget for soft failures.
    pub reruns_left: u32,

    /// Tasks in the same graph that list this task as a prerequisite.
    pub dependents: BTreeSet<TaskId>,

    /// Prerequisite tasks that must all succeed before this task may run.
    pub requires: BTreeSet<TaskId>,

    /// Opaque task definition handed to the execution queue when this task
    /// is scheduled.
    #[serde(default)]
    pub definition: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl TaskEntity {
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }

    /// Whether the task resolved successfully.
    pub fn succeeded(&self) -> bool {
        self.resolution.as_ref().map_or(false, |r| r.success)
    }

    /// A leaf has no dependents; its success feeds the graph-finish check
    /// instead of dependent scheduling.
    pub fn is_leaf(&self) -> bool {
        self.dependents.is_empty()
    }
}

/// Durable record of a task-graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGraphEntity {
    pub task_graph_id: TaskGraphId,

    pub state: GraphState,

    /// Leaf tasks that must still succeed before the graph counts as
    /// finished. Initialised to the graph's leaves at submission and only
    /// ever shrinks.
    pub requires_left: BTreeSet<TaskId>,

    /// Opaque routing value threaded into outbound event routing keys so
    /// consumers can filter per graph. Immutable after creation.
    pub routing: String,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub metadata: serde_json::Value,

    #[serde(default)]
    pub tags: serde_json::Value,
}

impl TaskGraphEntity {
    /// Point-in-time status snapshot included in lifecycle events.
    pub fn status(&self) -> TaskGraphStatus {
        TaskGraphStatus {
            task_graph_id: self.task_graph_id.clone(),
            state: self.state,
        }
    }
}

/// Externally visible status of a graph, embedded in outbound events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskGraphStatus {
    pub task_graph_id: TaskGraphId,
    pub state: GraphState,
}
