// src/store/memory.rs

//! In-memory implementations of the store ports.
//!
//! Records are versioned behind a mutex: `modify` snapshots the record,
//! applies the mutator to the copy, and commits only if the version is
//! unchanged; otherwise it reloads and re-invokes the mutator, exactly like
//! the real store contract. `force_conflicts` makes the next N commit
//! attempts lose the race, so tests can exercise the replay discipline
//! deterministically.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::GraphschedError;
use crate::graph::entity::{TaskEntity, TaskGraphEntity};
use crate::store::{Mutator, StoreFuture, TaskGraphStore, TaskStore};

#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    value: T,
}

/// Shared versioned record map with CAS semantics.
#[derive(Debug)]
struct Records<K, T> {
    entries: Mutex<HashMap<K, Versioned<T>>>,
    forced_conflicts: AtomicUsize,
}

impl<K, T> Default for Records<K, T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            forced_conflicts: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, T: Clone> Records<K, T> {
    fn insert(&self, key: K, value: T) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, Versioned { version: 0, value });
    }

    fn get(&self, key: &K) -> Option<T> {
        let entries = self.entries.lock().unwrap();
        entries.get(key).map(|rec| rec.value.clone())
    }

    fn modify_with(&self, key: &K, mutator: &mut (dyn FnMut(&mut T) + Send)) -> Option<T> {
        loop {
            let (version, mut draft) = {
                let entries = self.entries.lock().unwrap();
                let rec = entries.get(key)?;
                (rec.version, rec.value.clone())
            };

            mutator(&mut draft);

            if self.take_forced_conflict() {
                // Simulated lost race; reload and replay the mutator.
                continue;
            }

            let mut entries = self.entries.lock().unwrap();
            let rec = entries.get_mut(key)?;
            if rec.version != version {
                // A concurrent commit won; replay on the fresh state.
                continue;
            }

            rec.version += 1;
            rec.value = draft.clone();
            return Some(draft);
        }
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

/// In-memory Task family.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    inner: Arc<Records<(String, String), TaskEntity>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a task record, as the submission API would.
    pub fn insert(&self, task: TaskEntity) {
        let key = (task.task_graph_id.clone(), task.task_id.clone());
        self.inner.insert(key, task);
    }

    /// Direct read for assertions.
    pub fn get(&self, task_graph_id: &str, task_id: &str) -> Option<TaskEntity> {
        self.inner
            .get(&(task_graph_id.to_string(), task_id.to_string()))
    }

    /// Make the next `n` commit attempts lose the CAS race.
    pub fn force_conflicts(&self, n: usize) {
        self.inner.forced_conflicts.fetch_add(n, Ordering::SeqCst);
    }
}

impl TaskStore for MemoryTaskStore {
    fn load<'a>(
        &'a self,
        task_graph_id: &'a str,
        task_id: &'a str,
    ) -> StoreFuture<'a, TaskEntity> {
        Box::pin(async move {
            self.get(task_graph_id, task_id).ok_or_else(|| {
                GraphschedError::EntityNotFound(format!("task {task_graph_id}/{task_id}"))
            })
        })
    }

    fn modify<'a>(
        &'a self,
        task_graph_id: &'a str,
        task_id: &'a str,
        mutator: Mutator<'a, TaskEntity>,
    ) -> StoreFuture<'a, TaskEntity> {
        Box::pin(async move {
            let key = (task_graph_id.to_string(), task_id.to_string());
            self.inner.modify_with(&key, mutator).ok_or_else(|| {
                GraphschedError::EntityNotFound(format!("task {task_graph_id}/{task_id}"))
            })
        })
    }
}

/// In-memory TaskGraph family.
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskGraphStore {
    inner: Arc<Records<String, TaskGraphEntity>>,
}

impl MemoryTaskGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a graph record, as the submission API would.
    pub fn insert(&self, graph: TaskGraphEntity) {
        self.inner.insert(graph.task_graph_id.clone(), graph);
    }

    /// Direct read for assertions.
    pub fn get(&self, task_graph_id: &str) -> Option<TaskGraphEntity> {
        self.inner.get(&task_graph_id.to_string())
    }

    /// Make the next `n` commit attempts lose the CAS race.
    pub fn force_conflicts(&self, n: usize) {
        self.inner.forced_conflicts.fetch_add(n, Ordering::SeqCst);
    }
}

impl TaskGraphStore for MemoryTaskGraphStore {
    fn load<'a>(&'a self, task_graph_id: &'a str) -> StoreFuture<'a, TaskGraphEntity> {
        Box::pin(async move {
            self.get(task_graph_id).ok_or_else(|| {
                GraphschedError::EntityNotFound(format!("task-graph {task_graph_id}"))
            })
        })
    }

    fn modify<'a>(
        &'a self,
        task_graph_id: &'a str,
        mutator: Mutator<'a, TaskGraphEntity>,
    ) -> StoreFuture<'a, TaskGraphEntity> {
        Box::pin(async move {
            let key = task_graph_id.to_string();
            self.inner.modify_with(&key, mutator).ok_or_else(|| {
                GraphschedError::EntityNotFound(format!("task-graph {task_graph_id}"))
            })
        })
    }
}
