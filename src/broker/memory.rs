// src/broker/memory.rs

//! In-process bus implementation for tests and local wiring.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::broker::{BusFuture, MessageBus};
use crate::errors::GraphschedError;

/// One captured outbound publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

impl PublishedMessage {
    /// Decode the payload for assertions.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.payload).expect("published payload is JSON")
    }
}

/// Records publications; `fail_next_publishes` makes the next N publish
/// calls return an error so transient-failure handling can be tested.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    failures: Arc<AtomicUsize>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publication so far, in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Publications on one exchange, in order.
    pub fn published_on(&self, exchange: &str) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.exchange == exchange)
            .cloned()
            .collect()
    }

    /// Make the next `n` publish calls fail.
    pub fn fail_next_publishes(&self, n: usize) {
        self.failures.fetch_add(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl MessageBus for MemoryBus {
    fn publish<'a>(
        &'a self,
        exchange: &'a str,
        routing_key: &'a str,
        payload: Vec<u8>,
    ) -> BusFuture<'a, ()> {
        Box::pin(async move {
            if self.take_failure() {
                return Err(GraphschedError::Publish(format!(
                    "injected publish failure on {exchange}"
                )));
            }

            self.published.lock().unwrap().push(PublishedMessage {
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                payload,
            });

            Ok(())
        })
    }
}
