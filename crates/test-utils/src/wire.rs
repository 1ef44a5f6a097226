use graphsched::broker::{AckDisposition, Delivery};
use tokio::sync::oneshot;

/// Build a delivery plus the receiver the broker side would await for its
/// disposition.
pub fn delivery(
    exchange: &str,
    routing_key: &str,
    payload: serde_json::Value,
) -> (Delivery, oneshot::Receiver<AckDisposition>) {
    let (ack, disposition) = oneshot::channel();
    (
        Delivery {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload: serde_json::to_vec(&payload).expect("payload serializes"),
            ack,
        },
        disposition,
    )
}

/// `task-completed` payload with the given outcome.
pub fn completed_payload(task_id: &str, success: bool) -> serde_json::Value {
    serde_json::json!({
        "status": { "taskId": task_id },
        "success": success,
    })
}

/// `task-failed` payload.
pub fn failed_payload(task_id: &str) -> serde_json::Value {
    serde_json::json!({
        "status": { "taskId": task_id },
    })
}
