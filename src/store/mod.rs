// src/store/mod.rs

//! Entity store ports.
//!
//! The durable store is an external collaborator; the scheduler core only
//! depends on these two families. `modify` runs the mutator against a fresh
//! copy of the entity and commits under optimistic concurrency: on a write
//! conflict the entity is reloaded and the mutator re-invoked from scratch
//! until the commit succeeds.
//!
//! Mutators must therefore be synchronous, free of I/O and safe to replay.
//! Any "did this transition happen" boolean observed after `modify` resolves
//! must be re-initialised at the top of the mutator body, so a replayed
//! attempt reports the winning outcome rather than a stale one. All side
//! effects (queue RPCs, event publication) belong strictly after `modify`
//! resolves, never inside the mutator.

pub mod memory;

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::graph::entity::{TaskEntity, TaskGraphEntity};

pub use memory::{MemoryTaskGraphStore, MemoryTaskStore};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Mutator passed to `modify`: a synchronous closure over the entity's
/// fields, re-invoked from scratch on every CAS conflict.
pub type Mutator<'a, T> = &'a mut (dyn FnMut(&mut T) + Send);

/// Port over the durable Task family.
pub trait TaskStore: Send + Sync {
    /// Load a task by composite key, failing with `EntityNotFound` when
    /// absent.
    fn load<'a>(
        &'a self,
        task_graph_id: &'a str,
        task_id: &'a str,
    ) -> StoreFuture<'a, TaskEntity>;

    /// Apply `mutator` under CAS retry and return the committed record.
    fn modify<'a>(
        &'a self,
        task_graph_id: &'a str,
        task_id: &'a str,
        mutator: Mutator<'a, TaskEntity>,
    ) -> StoreFuture<'a, TaskEntity>;
}

/// Port over the durable TaskGraph family.
pub trait TaskGraphStore: Send + Sync {
    /// Load a graph, failing with `EntityNotFound` when absent.
    fn load<'a>(&'a self, task_graph_id: &'a str) -> StoreFuture<'a, TaskGraphEntity>;

    /// Apply `mutator` under CAS retry and return the committed record.
    fn modify<'a>(
        &'a self,
        task_graph_id: &'a str,
        mutator: Mutator<'a, TaskGraphEntity>,
    ) -> StoreFuture<'a, TaskGraphEntity>;
}
