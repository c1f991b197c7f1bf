//! Task Registry.
//!
//! The authoritative lifecycle record for every submitted task: its `status`
//! and `failure_count` across the task's full life, independent of whoever
//! physically holds its data at a given moment (the Priority Queue while
//! pending, an `Assignment` while in flight). Mirrors `WorkerRegistry`'s
//! single-lock-per-collection convention.

use crate::models::task::Task;
use std::collections::HashMap;
use std::sync::RwLock;

/// Serialized around each mutation; reads proceed over an immutable snapshot.
pub struct TaskRegistry {
    tasks: RwLock<HashMap<String, Task>>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        TaskRegistry {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, task: Task) {
        self.tasks
            .write()
            .expect("task registry lock poisoned")
            .insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().expect("task registry lock poisoned").get(id).cloned()
    }

    pub fn mutate<F: FnOnce(&mut Task)>(&self, id: &str, f: F) {
        if let Some(t) = self.tasks.write().expect("task registry lock poisoned").get_mut(id) {
            f(t);
        }
    }

    pub fn remove(&self, id: &str) -> Option<Task> {
        self.tasks.write().expect("task registry lock poisoned").remove(id)
    }

    pub fn all(&self) -> Vec<Task> {
        self.tasks.read().expect("task registry lock poisoned").values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskComplexity, TaskRequirements, TaskStatus};
    use chrono::Utc;
    use serde_json::json;

    fn task(id: &str, now: chrono::DateTime<Utc>) -> Task {
        Task::new(id, id, "d", "generic", TaskComplexity::Medium, 50, TaskRequirements::default(), json!({}), now, None, 1.0)
    }

    #[test]
    fn insert_then_mutate_status() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        registry.insert(task("t1", now));
        registry.mutate("t1", |t| t.status = TaskStatus::Completed);
        assert_eq!(registry.get("t1").unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn mutate_on_missing_id_is_a_no_op() {
        let registry = TaskRegistry::new();
        registry.mutate("missing", |t| t.status = TaskStatus::Completed);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn remove_returns_and_drops_the_task() {
        let registry = TaskRegistry::new();
        let now = Utc::now();
        registry.insert(task("t1", now));
        assert!(registry.remove("t1").is_some());
        assert!(registry.get("t1").is_none());
    }
}
