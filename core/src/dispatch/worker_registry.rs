//! Worker Registry.
//!
//! Lifecycle, heartbeat, and capability-profile ownership for every worker.
//! Grounded on `task_distribution_engine.py WorkloadMonitor` plus the
//! teacher's own single-lock-per-collection convention for its `Agent` set.

use crate::models::worker::WorkerProfile;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// Serialized around each mutation; reads may proceed over an immutable
/// snapshot without blocking other readers (§5).
pub struct WorkerRegistry {
    workers: RwLock<HashMap<String, WorkerProfile>>,
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerRegistry {
    pub fn new() -> Self {
        WorkerRegistry {
            workers: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, worker: WorkerProfile) {
        self.workers
            .write()
            .expect("worker registry lock poisoned")
            .insert(worker.id.clone(), worker);
    }

    pub fn get(&self, id: &str) -> Option<WorkerProfile> {
        self.workers.read().expect("worker registry lock poisoned").get(id).cloned()
    }

    pub fn heartbeat(&self, id: &str, at: DateTime<Utc>) {
        if let Some(w) = self.workers.write().expect("worker registry lock poisoned").get_mut(id) {
            w.last_heartbeat = at;
        }
    }

    /// Workers with spare capacity and a fresh heartbeat, ordered by remaining
    /// capacity descending, as the Dispatcher's cycle requires (§4.7). A
    /// worker whose consecutive-error streak has reached `error_streak_threshold`
    /// is excluded until a success resets it (§7).
    pub fn available_by_capacity(
        &self,
        now: DateTime<Utc>,
        staleness_secs: u64,
        error_streak_threshold: u32,
    ) -> Vec<WorkerProfile> {
        let guard = self.workers.read().expect("worker registry lock poisoned");
        let mut available: Vec<WorkerProfile> = guard
            .values()
            .filter(|w| {
                w.has_capacity()
                    && w.is_heartbeat_fresh(now, staleness_secs)
                    && w.error_streak < error_streak_threshold
            })
            .cloned()
            .collect();
        available.sort_by(|a, b| b.remaining_capacity().cmp(&a.remaining_capacity()));
        available
    }

    /// Workers whose heartbeat has gone stale, so the Dispatcher can revoke
    /// their in-flight assignments (§4.7 failure semantics).
    pub fn stale(&self, now: DateTime<Utc>, staleness_secs: u64) -> Vec<WorkerProfile> {
        self.workers
            .read()
            .expect("worker registry lock poisoned")
            .values()
            .filter(|w| !w.is_heartbeat_fresh(now, staleness_secs))
            .cloned()
            .collect()
    }

    pub fn mutate<F: FnOnce(&mut WorkerProfile)>(&self, id: &str, f: F) {
        if let Some(w) = self.workers.write().expect("worker registry lock poisoned").get_mut(id) {
            f(w);
        }
    }

    pub fn all(&self) -> Vec<WorkerProfile> {
        self.workers.read().expect("worker registry lock poisoned").values().cloned().collect()
    }
}
