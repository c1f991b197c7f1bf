//! Stakeholder event channel.
//!
//! Generalizes the teacher's `models/event.rs` event log (append-only record
//! of what happened during a run) into a live broadcast stakeholders can
//! subscribe to, carried over `crossbeam-channel` rather than buffered in a
//! `Vec`, since this system is long-running rather than a single simulation
//! pass with a log to inspect afterward.

use crate::models::report::ReportSummary;
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single stakeholder-visible occurrence, matching the external-interfaces
/// contract's `task-accepted`/`task-completed`/`task-failed`/`load-warning`/
/// `report-ready` payload shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StakeholderEvent {
    /// A worker accepted a dispatched task.
    TaskAccepted {
        task_id: String,
        worker_id: String,
        estimated_completion: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A worker reported a task complete.
    TaskCompleted {
        task_id: String,
        worker_id: String,
        deliverables: Value,
        quality_metrics: HashMap<String, f64>,
        at: DateTime<Utc>,
    },
    /// A task failed on a worker. `terminal` is set once the task has failed
    /// on enough distinct workers to be transitioned to `failed` for good;
    /// otherwise it remains queued for another attempt.
    TaskFailed {
        task_id: String,
        worker_id: String,
        reason: String,
        terminal: bool,
        at: DateTime<Utc>,
    },
    /// The queue crossed the high-water mark, a worker went stale, or an
    /// assignment timed out.
    LoadWarning {
        queue_depth: usize,
        reason: String,
        at: DateTime<Utc>,
    },
    /// A financial report finished aggregating and is ready to read.
    ReportReady {
        report_id: String,
        summary: ReportSummary,
        at: DateTime<Utc>,
    },
    /// A transaction was held for manual review by the fraud screen.
    TransactionHeld {
        transaction_id: String,
        risk_factors: Vec<String>,
        at: DateTime<Utc>,
    },
}

/// One end of the stakeholder broadcast: the system's sender, plus the
/// subscriber-facing receiver. Multiple subscribers can each hold a clone of
/// the receiver side only if built over a broadcast primitive; here, matching
/// `crossbeam_channel`'s MPMC semantics, every receiver clone competes for
/// each event rather than all observing it. Callers that need fan-out should
/// keep a single dedicated relay subscriber and re-publish from there.
pub fn stakeholder_channel() -> (Sender<StakeholderEvent>, Receiver<StakeholderEvent>) {
    unbounded()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_flow_through_channel() {
        let (tx, rx) = stakeholder_channel();
        let now = Utc::now();
        tx.send(StakeholderEvent::LoadWarning {
            queue_depth: 7,
            reason: "queue at high water".to_string(),
            at: now,
        })
        .unwrap();
        let received = rx.recv().unwrap();
        assert_eq!(
            received,
            StakeholderEvent::LoadWarning {
                queue_depth: 7,
                reason: "queue at high water".to_string(),
                at: now,
            }
        );
    }
}
