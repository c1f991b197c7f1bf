//! Worker plug-in contract.
//!
//! The specialized worker agents' business logic is explicitly out of scope
//! (§1): this crate only defines the interface they must satisfy, grounded on
//! the teacher's `policy::CashManagerPolicy` trait-object pattern (a small
//! `Box<dyn Trait + Send + Sync>` seam a host implements and passes in).

use crate::models::task::Task;
use serde_json::Value;
use std::collections::HashMap;

/// What a worker reports back about whether it will take on a task.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub accept: bool,
    pub reason: Option<String>,
    pub estimated_hours: f64,
}

/// Terminal state of a worker's attempt at a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Completed,
    Failed,
}

/// The result of a worker executing a task.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub status: ProcessStatus,
    pub deliverables: Value,
    pub quality_metrics: HashMap<String, f64>,
    pub performance_indicators: HashMap<String, f64>,
    pub error_message: Option<String>,
}

/// Satisfied by each specialized worker agent. The Dispatcher holds a
/// `Box<dyn WorkerExecutor + Send + Sync>` per registered worker and never
/// inspects what's behind it beyond this contract.
pub trait WorkerExecutor: Send + Sync {
    /// Capability tags and per-tag proficiency this executor declares.
    fn capabilities(&self) -> (Vec<String>, HashMap<String, f64>);

    /// Whether this executor will take on `task`, and its own time estimate.
    fn validate(&self, task: &Task) -> ValidationOutcome;

    /// Execute `task` to completion or failure. Blocking is expected; the
    /// Dispatcher never waits on this call directly (§5) — it is invoked on a
    /// worker-owned thread and the result observed via the worker-result channel.
    fn process(&self, task: &Task) -> ProcessResult;
}
