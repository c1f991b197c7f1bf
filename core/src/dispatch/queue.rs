//! Priority Queue.
//!
//! Max-heap over composite priority, ties broken by insertion order.
//! Grounded on `task_distribution_engine.py IntelligentTaskQueue`'s `heapq`
//! usage, reimplemented over `std::collections::BinaryHeap` with an explicit
//! insertion sequence number standing in for Python's FIFO-stable tuple key.

use crate::dispatch::priority_engine::{score_priority, SystemContext};
use crate::models::task::Task;
use crate::models::worker::WorkerProfile;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct QueuedTask {
    composite: f64,
    sequence: u64,
    task: Task,
}

impl PartialEq for QueuedTask {
    fn eq(&self, other: &Self) -> bool {
        self.composite == other.composite && self.sequence == other.sequence
    }
}
impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher composite first; on a tie, earlier sequence (FIFO) wins,
        // which means it must compare as *greater* in a max-heap.
        self.composite
            .partial_cmp(&other.composite)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Summary of queue depth by status, for `pendingSummary()`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingSummary {
    pub depth: usize,
    pub mean_composite: f64,
}

/// A single-lock-serialized max-heap of pending tasks.
pub struct PriorityQueue {
    heap: BinaryHeap<QueuedTask>,
    next_sequence: u64,
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityQueue {
    pub fn new() -> Self {
        PriorityQueue {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn enqueue(&mut self, task: Task, composite: f64) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(QueuedTask {
            composite,
            sequence,
            task,
        });
    }

    pub fn depth(&self) -> usize {
        self.heap.len()
    }

    pub fn pending_summary(&self) -> PendingSummary {
        if self.heap.is_empty() {
            return PendingSummary::default();
        }
        let total: f64 = self.heap.iter().map(|q| q.composite).sum();
        PendingSummary {
            depth: self.heap.len(),
            mean_composite: total / self.heap.len() as f64,
        }
    }

    /// Fraction of `required` present in `available`, used for the ≥70% capability gate.
    fn coverage(required: &[String], available: &[String]) -> f64 {
        if required.is_empty() {
            return 1.0;
        }
        let covered = required.iter().filter(|t| available.contains(t)).count();
        covered as f64 / required.len() as f64
    }

    /// Return the highest-priority task for which `worker` covers at least
    /// 70% of required capability tags, removing only that task from the
    /// queue. Tasks scanned past but not selected remain queued (§4.5:
    /// "non-destructive scan").
    pub fn dequeue_optimal(&mut self, worker: &WorkerProfile) -> Option<Task> {
        let mut skipped = Vec::new();
        let mut selected = None;

        while let Some(candidate) = self.heap.pop() {
            let coverage = Self::coverage(&candidate.task.requirements.required_capabilities, &worker.capability_tags);
            if coverage >= 0.70 {
                selected = Some(candidate.task);
                break;
            }
            skipped.push(candidate);
        }

        for s in skipped {
            self.heap.push(s);
        }
        selected
    }

    /// Put a task back in the queue, e.g. after a compatibility-floor skip or
    /// a dispatch timeout.
    pub fn requeue(&mut self, task: Task, composite: f64) {
        self.enqueue(task, composite);
    }

    /// Recompute every queued task's composite via the Priority Engine and
    /// re-heapify. A no-op on ordering when `ctx` is unchanged from the last
    /// rebalance (§8: "re-heap idempotence").
    pub fn rebalance(&mut self, ctx: &SystemContext, now: DateTime<Utc>) {
        let old: Vec<QueuedTask> = std::mem::take(&mut self.heap).into_vec();
        for mut entry in old {
            let score = score_priority(&entry.task, ctx, now);
            entry.composite = score.composite;
            entry.task.priority = Some(score);
            self.heap.push(entry);
        }
    }
}
