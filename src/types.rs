// src/types.rs

//! Canonical identifier aliases used throughout the crate.

/// Identifier of a task within its graph. Unique per graph, assigned by the
/// submission API.
pub type TaskId = String;

/// Identifier of a task-graph. Globally unique, assigned by the submission
/// API.
pub type TaskGraphId = String;
