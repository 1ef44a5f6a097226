// src/broker/mod.rs

//! Broker-facing wire contract.
//!
//! - [`messages`] defines the payload schemas for the four exchanges.
//! - [`ingress`] consumes inbound deliveries and drives the dispatcher.
//! - [`memory`] provides an in-process bus used by tests and local wiring.
//!
//! The broker connection itself (AMQP framing, reconnects, queue binding) is
//! an external collaborator: it feeds [`Delivery`] values into the ingress
//! channel and settles redelivery from the [`AckDisposition`] the ingress
//! reports back.

pub mod ingress;
pub mod memory;
pub mod messages;

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;

use crate::errors::Result;

pub use ingress::Ingress;
pub use memory::{MemoryBus, PublishedMessage};

/// Exchange carrying task-completed notifications from the execution queue.
pub const TASK_COMPLETED_EXCHANGE: &str = "task-completed";

/// Exchange carrying post-retry-exhaustion task failures.
pub const TASK_FAILED_EXCHANGE: &str = "task-failed";

/// Exchange this scheduler publishes graph-blocked events on.
pub const TASK_GRAPH_BLOCKED_EXCHANGE: &str = "task-graph-blocked";

/// Exchange this scheduler publishes graph-finished events on.
pub const TASK_GRAPH_FINISHED_EXCHANGE: &str = "task-graph-finished";

/// Final disposition reported back to the broker for one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDisposition {
    /// Handled successfully; the broker may drop the message.
    Ack,
    /// Transient handler failure; the broker should redeliver.
    Requeue,
    /// Permanent failure (protocol violation); do not redeliver.
    Reject,
}

/// One inbound broker message, as handed to the ingress.
#[derive(Debug)]
pub struct Delivery {
    pub exchange: String,

    /// Dotted routing key the message was delivered with. Bound with the
    /// pattern `<scheduler_id>.#`, so segment 1 is the graph id.
    pub routing_key: String,

    pub payload: Vec<u8>,

    /// Settled by the ingress once the handler resolves. If the sender is
    /// dropped without a disposition the broker side should treat the
    /// delivery as requeued.
    pub ack: oneshot::Sender<AckDisposition>,
}

/// Boxed future returned by bus operations.
pub type BusFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Outbound publish port on the broker connection.
pub trait MessageBus: Send + Sync {
    fn publish<'a>(
        &'a self,
        exchange: &'a str,
        routing_key: &'a str,
        payload: Vec<u8>,
    ) -> BusFuture<'a, ()>;
}
