// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphschedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Message from unexpected exchange: {0}")]
    UnexpectedExchange(String),

    #[error("Malformed routing key: {0}")]
    MalformedRoutingKey(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("Execution queue request failed: {0}")]
    QueueRequest(String),

    #[error("Event publication failed: {0}")]
    Publish(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphschedError {
    /// Protocol violations are permanent: redelivering the same message can
    /// never succeed, so the ingress rejects these instead of requeueing.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            GraphschedError::UnexpectedExchange(_)
                | GraphschedError::MalformedRoutingKey(_)
                | GraphschedError::MalformedPayload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GraphschedError>;
