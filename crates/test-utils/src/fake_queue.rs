use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use graphsched::errors::GraphschedError;
use graphsched::queue::{QueueClient, QueueFuture};

/// A fake execution-queue client that:
/// - records which tasks were scheduled and which were rerun, in call order
/// - optionally fails the next N requests so redelivery paths can be tested.
#[derive(Debug, Clone, Default)]
pub struct FakeQueue {
    scheduled: Arc<Mutex<Vec<String>>>,
    reruns: Arc<Mutex<Vec<String>>>,
    failures: Arc<AtomicUsize>,
}

impl FakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<String> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn reruns(&self) -> Vec<String> {
        self.reruns.lock().unwrap().clone()
    }

    /// Make the next `n` queue requests fail.
    pub fn fail_next_requests(&self, n: usize) {
        self.failures.fetch_add(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl QueueClient for FakeQueue {
    fn schedule_task<'a>(
        &'a self,
        task_id: &'a str,
        _definition: &'a serde_json::Value,
    ) -> QueueFuture<'a, ()> {
        Box::pin(async move {
            if self.take_failure() {
                return Err(GraphschedError::QueueRequest(format!(
                    "injected failure scheduling {task_id}"
                )));
            }
            self.scheduled.lock().unwrap().push(task_id.to_string());
            Ok(())
        })
    }

    fn rerun_task<'a>(&'a self, task_id: &'a str) -> QueueFuture<'a, ()> {
        Box::pin(async move {
            if self.take_failure() {
                return Err(GraphschedError::QueueRequest(format!(
                    "injected failure rerunning {task_id}"
                )));
            }
            self.reruns.lock().unwrap().push(task_id.to_string());
            Ok(())
        })
    }
}
