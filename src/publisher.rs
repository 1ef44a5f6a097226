// src/publisher.rs

//! Outbound lifecycle event publication.
//!
//! Serializes the two graph lifecycle events and sends them on their
//! exchanges, with the routing key taken from the graph's stored `routing`
//! value so downstream consumers can filter per graph. Publication failures
//! propagate to the calling handler, which nacks its delivery.

use std::sync::Arc;

use tracing::info;

use crate::broker::messages::{TaskGraphBlockedMessage, TaskGraphFinishedMessage};
use crate::broker::MessageBus;
use crate::errors::Result;
use crate::graph::entity::TaskGraphEntity;

/// Publisher for `taskGraphBlocked` / `taskGraphFinished`.
pub struct LifecyclePublisher {
    bus: Arc<dyn MessageBus>,
    blocked_exchange: String,
    finished_exchange: String,
}

impl LifecyclePublisher {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        blocked_exchange: impl Into<String>,
        finished_exchange: impl Into<String>,
    ) -> Self {
        Self {
            bus,
            blocked_exchange: blocked_exchange.into(),
            finished_exchange: finished_exchange.into(),
        }
    }

    /// Publish `taskGraphBlocked` with the blocking task.
    pub async fn task_graph_blocked(
        &self,
        graph: &TaskGraphEntity,
        blocking_task_id: &str,
    ) -> Result<()> {
        let message = TaskGraphBlockedMessage {
            status: graph.status(),
            task_id: blocking_task_id.to_string(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.bus
            .publish(&self.blocked_exchange, &graph.routing, payload)
            .await?;

        info!(
            graph = %graph.task_graph_id,
            task = %blocking_task_id,
            "published taskGraphBlocked"
        );
        Ok(())
    }

    /// Publish `taskGraphFinished`.
    pub async fn task_graph_finished(&self, graph: &TaskGraphEntity) -> Result<()> {
        let message = TaskGraphFinishedMessage {
            status: graph.status(),
        };
        let payload = serde_json::to_vec(&message)?;

        self.bus
            .publish(&self.finished_exchange, &graph.routing, payload)
            .await?;

        info!(graph = %graph.task_graph_id, "published taskGraphFinished");
        Ok(())
    }
}
