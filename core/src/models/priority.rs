//! Composite priority scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An event that forces the Priority Engine to re-score a task ahead of schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecomputeTrigger {
    SystemLoadChange,
    WorkerAvailabilityChange,
    DeadlineCrossing,
    HourlyDeadlineCheck,
    DailyDeadlineCheck,
    DependencyStateChange,
    HighValueMonitoring,
}

/// The five weighted sub-scores plus their composite, as produced by the Priority Engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityScore {
    pub composite: f64,
    pub urgency: f64,
    pub business_impact: f64,
    pub resource_efficiency: f64,
    pub revenue_impact: f64,
    pub dependency: f64,
    pub computed_at: DateTime<Utc>,
    /// Which events force this score to be recomputed ahead of the next
    /// scheduled rebalance (§4.4).
    pub triggers: HashSet<RecomputeTrigger>,
}

impl PriorityScore {
    /// Recompute triggers attached per spec §4.4: always load/availability change,
    /// plus deadline-check cadence, plus dependency/high-value monitoring when applicable.
    pub fn triggers_for(
        has_deadline_under_48h: bool,
        has_dependencies: bool,
        revenue_potential_over_1000: bool,
    ) -> HashSet<RecomputeTrigger> {
        let mut triggers = HashSet::new();
        triggers.insert(RecomputeTrigger::SystemLoadChange);
        triggers.insert(RecomputeTrigger::WorkerAvailabilityChange);
        if has_deadline_under_48h {
            triggers.insert(RecomputeTrigger::HourlyDeadlineCheck);
        } else {
            triggers.insert(RecomputeTrigger::DailyDeadlineCheck);
        }
        if has_dependencies {
            triggers.insert(RecomputeTrigger::DependencyStateChange);
        }
        if revenue_potential_over_1000 {
            triggers.insert(RecomputeTrigger::HighValueMonitoring);
        }
        triggers
    }
}
