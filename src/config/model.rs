// src/config/model.rs

use serde::Deserialize;

use crate::broker;

/// Top-level settings as read from a TOML file.
///
/// ```toml
/// scheduler_id = "sched-1"
/// channel_capacity = 64
///
/// [exchanges]
/// task_completed = "task-completed"
/// task_failed = "task-failed"
/// ```
///
/// Everything except `scheduler_id` has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Identifier this scheduler instance binds its subscriptions with.
    /// Inbound routing keys must start with `<scheduler_id>.`.
    pub scheduler_id: String,

    /// Exchange names from `[exchanges]`.
    #[serde(default)]
    pub exchanges: ExchangeSection,

    /// Capacity of the delivery channel between the broker adapter and the
    /// ingress loop.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    64
}

impl SchedulerSettings {
    /// Settings with every defaulted field, for embedding services and tests
    /// that do not load a TOML file.
    pub fn new(scheduler_id: impl Into<String>) -> Self {
        Self {
            scheduler_id: scheduler_id.into(),
            exchanges: ExchangeSection::default(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// `[exchanges]` section: names of the two inbound and two outbound
/// exchanges.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSection {
    #[serde(default = "default_task_completed")]
    pub task_completed: String,

    #[serde(default = "default_task_failed")]
    pub task_failed: String,

    #[serde(default = "default_task_graph_blocked")]
    pub task_graph_blocked: String,

    #[serde(default = "default_task_graph_finished")]
    pub task_graph_finished: String,
}

fn default_task_completed() -> String {
    broker::TASK_COMPLETED_EXCHANGE.to_string()
}

fn default_task_failed() -> String {
    broker::TASK_FAILED_EXCHANGE.to_string()
}

fn default_task_graph_blocked() -> String {
    broker::TASK_GRAPH_BLOCKED_EXCHANGE.to_string()
}

fn default_task_graph_finished() -> String {
    broker::TASK_GRAPH_FINISHED_EXCHANGE.to_string()
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            task_completed: default_task_completed(),
            task_failed: default_task_failed(),
            task_graph_blocked: default_task_graph_blocked(),
            task_graph_finished: default_task_graph_finished(),
        }
    }
}
