// src/broker/ingress.rs

//! Inbound delivery loop.
//!
//! Deliveries arrive on a channel from the broker adapter; each is handled
//! in its own task so independent graphs make progress concurrently, and
//! the disposition is settled only after the handler fully resolves,
//! including every store commit, queue RPC and lifecycle publication the
//! event triggers. Transient failures requeue; protocol violations are
//! rejected so a malformed message cannot redeliver forever.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::broker::{AckDisposition, Delivery};
use crate::dispatch;
use crate::errors::Result;
use crate::scheduler::Scheduler;

/// Consumes deliveries and drives the dispatcher.
pub struct Ingress {
    scheduler: Arc<Scheduler>,
    delivery_rx: mpsc::Receiver<Delivery>,
}

impl Ingress {
    pub fn new(scheduler: Arc<Scheduler>, delivery_rx: mpsc::Receiver<Delivery>) -> Self {
        Self {
            scheduler,
            delivery_rx,
        }
    }

    /// Main consume loop.
    ///
    /// Runs until the delivery channel closes, then drains in-flight
    /// handlers before returning so teardown never abandons a half-applied
    /// transition.
    pub async fn run(mut self) -> Result<()> {
        info!(scheduler_id = %self.scheduler.scheduler_id(), "graphsched ingress started");

        let mut in_flight = JoinSet::new();

        while let Some(delivery) = self.delivery_rx.recv().await {
            let scheduler = Arc::clone(&self.scheduler);
            in_flight.spawn(handle_delivery(scheduler, delivery));

            // Reap already-finished handlers so the set stays small.
            while in_flight.try_join_next().is_some() {}
        }

        info!("delivery channel closed; draining in-flight handlers");
        while in_flight.join_next().await.is_some() {}

        info!("ingress exiting");
        Ok(())
    }
}

/// Handle one delivery end to end and settle its disposition.
async fn handle_delivery(scheduler: Arc<Scheduler>, delivery: Delivery) {
    let Delivery {
        exchange,
        routing_key,
        payload,
        ack,
    } = delivery;

    debug!(%exchange, %routing_key, "received delivery");

    let disposition = match process(&scheduler, &exchange, &routing_key, &payload).await {
        Ok(()) => AckDisposition::Ack,
        Err(err) if err.is_protocol_violation() => {
            error!(
                %exchange,
                %routing_key,
                error = %err,
                "protocol violation; rejecting delivery"
            );
            AckDisposition::Reject
        }
        Err(err) => {
            warn!(
                %exchange,
                %routing_key,
                error = %err,
                "handler failed; requeueing delivery"
            );
            AckDisposition::Requeue
        }
    };

    if ack.send(disposition).is_err() {
        debug!(%exchange, %routing_key, "broker side dropped the ack channel");
    }
}

async fn process(
    scheduler: &Scheduler,
    exchange: &str,
    routing_key: &str,
    payload: &[u8],
) -> Result<()> {
    let event = dispatch::parse_delivery(scheduler, exchange, routing_key, payload)?;
    dispatch::dispatch(scheduler, event).await
}
