// src/graph/mod.rs

//! Task-graph entities and the progression engine.
//!
//! - [`entity`] holds the durable Task and TaskGraph records.
//! - [`progression`] advances a graph in response to queue notifications:
//!   recording resolutions, scheduling dependents whose prerequisites all
//!   succeeded, requesting reruns, and driving the `running` →
//!   `{finished, blocked}` transitions.

pub mod entity;
pub mod progression;

pub use entity::{GraphState, Resolution, TaskEntity, TaskGraphEntity, TaskGraphStatus};
