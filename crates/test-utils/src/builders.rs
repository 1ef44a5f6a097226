#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use graphsched::graph::entity::{GraphState, TaskEntity, TaskGraphEntity};
use graphsched::store::{MemoryTaskGraphStore, MemoryTaskStore};

/// Builder for a seeded task-graph across the two memory stores.
///
/// `dependents` and `requires_left` are derived from the `requires` edges
/// of the tasks, the same way the submission API populates them: a task's
/// dependents are everyone that requires it, and the graph's
/// `requires_left` starts as the set of tasks with no dependents.
pub struct TaskGraphBuilder {
    graph_id: String,
    routing: String,
    tasks: Vec<TaskEntity>,
}

impl TaskGraphBuilder {
    pub fn new(graph_id: &str) -> Self {
        Self {
            graph_id: graph_id.to_string(),
            routing: format!("route.{graph_id}"),
            tasks: Vec::new(),
        }
    }

    pub fn routing(mut self, routing: &str) -> Self {
        self.routing = routing.to_string();
        self
    }

    pub fn with_task(mut self, task: TaskEntity) -> Self {
        self.tasks.push(task);
        self
    }

    /// Seed the stores and return the graph record as inserted.
    pub fn build(
        self,
        tasks: &MemoryTaskStore,
        graphs: &MemoryTaskGraphStore,
    ) -> TaskGraphEntity {
        let mut entities: BTreeMap<String, TaskEntity> = self
            .tasks
            .into_iter()
            .map(|t| (t.task_id.clone(), t))
            .collect();

        let edges: Vec<(String, String)> = entities
            .values()
            .flat_map(|t| {
                t.requires
                    .iter()
                    .map(|r| (r.clone(), t.task_id.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();

        for (required, dependent) in edges {
            if let Some(entity) = entities.get_mut(&required) {
                entity.dependents.insert(dependent);
            }
        }

        let requires_left: BTreeSet<String> = entities
            .values()
            .filter(|t| t.dependents.is_empty())
            .map(|t| t.task_id.clone())
            .collect();

        let graph = TaskGraphEntity {
            task_graph_id: self.graph_id,
            state: GraphState::Running,
            requires_left,
            routing: self.routing,
            scopes: Vec::new(),
            metadata: serde_json::Value::Null,
            tags: serde_json::Value::Null,
        };

        for entity in entities.into_values() {
            tasks.insert(entity);
        }
        graphs.insert(graph.clone());

        graph
    }
}

/// Builder for a single `TaskEntity`.
pub struct TaskBuilder {
    task: TaskEntity,
}

impl TaskBuilder {
    pub fn new(graph_id: &str, task_id: &str) -> Self {
        Self {
            task: TaskEntity {
                task_graph_id: graph_id.to_string(),
                task_id: task_id.to_string(),
                reruns_left: 0,
                dependents: BTreeSet::new(),
                requires: BTreeSet::new(),
                definition: serde_json::json!({ "name": task_id }),
                resolution: None,
            },
        }
    }

    pub fn requires(mut self, task_id: &str) -> Self {
        self.task.requires.insert(task_id.to_string());
        self
    }

    pub fn reruns(mut self, n: u32) -> Self {
        self.task.reruns_left = n;
        self
    }

    pub fn definition(mut self, definition: serde_json::Value) -> Self {
        self.task.definition = definition;
        self
    }

    pub fn build(self) -> TaskEntity {
        self.task
    }
}
