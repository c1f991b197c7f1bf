//! Worker agents.
//!
//! Generalizes the teacher's `Agent` mutation style (checked, single-owner
//! mutation of a flat record) to a capability-tagged worker profile, and adds
//! the bounded rolling experience log the capability matcher reads from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One completed (or failed) task as recorded in a worker's rolling history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub task_type: String,
    pub complexity: crate::models::task::TaskComplexity,
    pub domain: String,
    /// 1.0 = fully successful, 0.0 = total failure; intermediate values allowed
    /// for partially-accepted deliverables.
    pub success_score: f64,
    pub completion_hours: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Rolling performance metrics, updated on each observed completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub success_rate: f64,
    pub efficiency: f64,
    pub error_rate: f64,
    pub avg_completion_hours: f64,
    pub quality_mean: f64,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        PerformanceMetrics {
            success_rate: 1.0,
            efficiency: 1.0,
            error_rate: 0.0,
            avg_completion_hours: 0.0,
            quality_mean: 1.0,
        }
    }
}

/// The bounded ring size for `WorkerProfile::experience_log` (spec §4.7: "bounded ring of last 100").
pub const EXPERIENCE_LOG_CAPACITY: usize = 100;

/// A specialized worker agent's capability and workload profile.
///
/// The worker's own business logic (content generation, lead qualification,
/// etc.) is out of scope; this is the shape the Capability Matcher and
/// Dispatcher see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub id: String,
    pub worker_type: String,
    pub capability_tags: Vec<String>,
    pub proficiencies: HashMap<String, f64>,
    pub specializations: Vec<String>,
    pub experience_log: VecDeque<ExperienceEntry>,
    pub metrics: PerformanceMetrics,
    pub current_workload: usize,
    pub max_concurrent_capacity: usize,
    pub learning_efficiency: f64,
    pub last_heartbeat: DateTime<Utc>,
    pub current_task_ids: Vec<String>,
    /// Consecutive-error counter used to take a worker out of rotation (§7).
    pub error_streak: u32,
}

impl WorkerProfile {
    pub fn new(
        id: impl Into<String>,
        worker_type: impl Into<String>,
        capability_tags: Vec<String>,
        max_concurrent_capacity: usize,
        now: DateTime<Utc>,
    ) -> Self {
        WorkerProfile {
            id: id.into(),
            worker_type: worker_type.into(),
            capability_tags,
            proficiencies: HashMap::new(),
            specializations: Vec::new(),
            experience_log: VecDeque::new(),
            metrics: PerformanceMetrics::default(),
            current_workload: 0,
            max_concurrent_capacity,
            learning_efficiency: 0.5,
            last_heartbeat: now,
            current_task_ids: Vec::new(),
            error_streak: 0,
        }
    }

    pub fn remaining_capacity(&self) -> usize {
        self.max_concurrent_capacity.saturating_sub(self.current_workload)
    }

    pub fn has_capacity(&self) -> bool {
        self.current_workload < self.max_concurrent_capacity
    }

    pub fn is_heartbeat_fresh(&self, now: DateTime<Utc>, staleness_secs: u64) -> bool {
        (now - self.last_heartbeat).num_seconds() <= staleness_secs as i64
    }

    /// Append to the rolling experience log, evicting the oldest entry once at capacity.
    pub fn record_experience(&mut self, entry: ExperienceEntry) {
        if self.experience_log.len() >= EXPERIENCE_LOG_CAPACITY {
            self.experience_log.pop_front();
        }
        self.experience_log.push_back(entry);
    }

    pub fn utilization(&self) -> f64 {
        if self.max_concurrent_capacity == 0 {
            return 1.0;
        }
        self.current_workload as f64 / self.max_concurrent_capacity as f64
    }
}
