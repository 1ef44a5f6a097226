// src/config/validate.rs

//! Semantic validation on top of deserialization.

use crate::config::model::SchedulerSettings;
use crate::errors::{GraphschedError, Result};

/// Check settings invariants that serde cannot express.
pub fn validate(settings: &SchedulerSettings) -> Result<()> {
    if settings.scheduler_id.is_empty() {
        return Err(GraphschedError::ConfigError(
            "scheduler_id must not be empty".to_string(),
        ));
    }

    // The scheduler id is segment 0 of every inbound routing key; a dot
    // inside it would shift the graph-id segment.
    if settings.scheduler_id.contains('.') {
        return Err(GraphschedError::ConfigError(format!(
            "scheduler_id must not contain '.': {}",
            settings.scheduler_id
        )));
    }

    if settings.channel_capacity == 0 {
        return Err(GraphschedError::ConfigError(
            "channel_capacity must be at least 1".to_string(),
        ));
    }

    let exchanges = [
        &settings.exchanges.task_completed,
        &settings.exchanges.task_failed,
        &settings.exchanges.task_graph_blocked,
        &settings.exchanges.task_graph_finished,
    ];

    if exchanges.iter().any(|name| name.is_empty()) {
        return Err(GraphschedError::ConfigError(
            "exchange names must not be empty".to_string(),
        ));
    }

    // The dispatcher disambiguates inbound messages by exchange name.
    if settings.exchanges.task_completed == settings.exchanges.task_failed {
        return Err(GraphschedError::ConfigError(format!(
            "task_completed and task_failed exchanges must differ: {}",
            settings.exchanges.task_completed
        )));
    }

    Ok(())
}
