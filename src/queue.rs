// src/queue.rs

//! Execution-queue client port.
//!
//! The queue actually runs tasks and owns its own retry budget; this
//! scheduler only ever asks it to schedule a dependent whose prerequisites
//! all succeeded, or to rerun a task after a soft failure. Both operations
//! are idempotent by task id on the queue side (at-most-once scheduling per
//! task), so handlers may repeat them freely on redelivery.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

/// Boxed future returned by queue operations.
pub type QueueFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Port over the downstream execution queue.
pub trait QueueClient: Send + Sync {
    /// Submit a task whose prerequisites have all succeeded.
    fn schedule_task<'a>(
        &'a self,
        task_id: &'a str,
        definition: &'a serde_json::Value,
    ) -> QueueFuture<'a, ()>;

    /// Ask the queue to run a task again after a soft failure.
    fn rerun_task<'a>(&'a self, task_id: &'a str) -> QueueFuture<'a, ()>;
}
