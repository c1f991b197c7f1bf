//! Immutable assignment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Binds a task to a worker at a point in time. Created on dispatch, never mutated;
/// terminates (by being removed from the active-assignment table) when the
/// executor reports completion or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub task_id: String,
    pub worker_id: String,
    pub assigned_at: DateTime<Utc>,
    pub estimated_completion: DateTime<Utc>,
    pub compatibility_composite: f64,
    pub reasoning: String,
}

impl Assignment {
    pub fn new(
        task_id: impl Into<String>,
        worker_id: impl Into<String>,
        assigned_at: DateTime<Utc>,
        estimated_completion: DateTime<Utc>,
        compatibility_composite: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Assignment {
            task_id: task_id.into(),
            worker_id: worker_id.into(),
            assigned_at,
            estimated_completion,
            compatibility_composite,
            reasoning: reasoning.into(),
        }
    }
}
