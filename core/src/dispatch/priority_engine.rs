//! Priority Engine.
//!
//! Computes the composite priority score in §4.4 from a task and the current
//! system context. Grounded on `task_distribution_engine.py
//! TaskPriorityEngine`, reimplemented as a pure function over plain structs
//! rather than a stateful class.

use crate::models::priority::PriorityScore;
use crate::models::task::{RevenueType, Task};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// System-wide context the Priority Engine reads when scoring a task:
/// current load, which capability tags are available among idle workers, and
/// which of the task's declared dependencies have completed.
#[derive(Debug, Clone, Default)]
pub struct SystemContext {
    /// Fraction of total worker capacity currently in use, in `[0,1]`.
    pub load_fraction: f64,
    /// Capability tags present among currently-available workers.
    pub available_expertise: HashSet<String>,
    /// `task_id -> completed`, for every dependency referenced by any queued task.
    pub dependency_state: HashMap<String, bool>,
}

fn urgency(task: &Task, now: DateTime<Utc>) -> f64 {
    let base = match task.hours_to_deadline(now) {
        None => 30.0,
        Some(h) if h <= 2.0 => 95.0,
        Some(h) if h <= 24.0 => 80.0,
        Some(h) if h <= 168.0 => 50.0,
        Some(_) => 20.0,
    };
    let aging_factor = (1.0 + task.days_waiting(now) * 0.1).min(1.5);
    let mut score = base * aging_factor;
    if let Some(h) = task.hours_to_deadline(now) {
        if h < 1.5 * task.estimated_effort_hours {
            score *= 1.3;
        }
    }
    score
}

fn business_impact(task: &Task) -> f64 {
    let client = task.requirements.client_tier.map(|c| c.multiplier()).unwrap_or(1.0);
    let strategic = task
        .requirements
        .strategic_importance
        .map(|s| s.multiplier())
        .unwrap_or(1.0);
    let stakeholder = task
        .requirements
        .stakeholder_level
        .map(|s| s.multiplier())
        .unwrap_or(1.0);
    let mut score = 50.0 * client * strategic * stakeholder;
    if matches!(
        task.task_type.as_str(),
        "client-deliverable" | "revenue-generation" | "compliance-requirement"
    ) {
        score *= 1.3;
    }
    score
}

fn resource_efficiency(task: &Task, ctx: &SystemContext) -> f64 {
    let load_factor = if ctx.load_fraction < 0.5 {
        1.2
    } else if ctx.load_fraction >= 0.8 {
        if task.estimated_effort_hours < 1.0 {
            1.5
        } else {
            0.8
        }
    } else {
        1.0
    };
    let required = &task.requirements.required_capabilities;
    let skill_coverage = if required.is_empty() {
        0.0
    } else {
        let covered = required.iter().filter(|tag| ctx.available_expertise.contains(*tag)).count();
        covered as f64 / required.len() as f64
    };
    50.0 * load_factor * (1.0 + 0.3 * skill_coverage)
}

fn revenue_impact(task: &Task) -> f64 {
    let base = match task.revenue_potential {
        Some(potential) if potential.is_positive() => {
            let scaled = (potential.to_cents() as f64 / 100.0 / 100.0).max(1.0);
            (30.0 + 20.0 * scaled.log10()).clamp(30.0, 90.0)
        }
        _ => return 20.0,
    };
    let multiplier = task
        .requirements
        .revenue_type
        .unwrap_or(RevenueType::Savings)
        .multiplier();
    base * multiplier
}

fn dependency(task: &Task, ctx: &SystemContext) -> f64 {
    let deps = &task.requirements.dependency_ids;
    let blocked = task.requirements.blocks_ids.len();
    let completed_ratio = if deps.is_empty() {
        1.0
    } else {
        let completed = deps.iter().filter(|d| ctx.dependency_state.get(*d).copied().unwrap_or(false)).count();
        completed as f64 / deps.len() as f64
    };
    50.0 * (1.0 + 0.2 * blocked as f64) * (1.0 - 0.1 * deps.len() as f64).max(0.0) * completed_ratio
}

/// Composite weights from §4.4.
const WEIGHT_URGENCY: f64 = 0.25;
const WEIGHT_BUSINESS: f64 = 0.30;
const WEIGHT_EFFICIENCY: f64 = 0.20;
const WEIGHT_REVENUE: f64 = 0.15;
const WEIGHT_DEPENDENCY: f64 = 0.10;

/// Revenue potential above which the High-Value-Monitoring trigger applies.
const HIGH_VALUE_MONITORING_FLOOR_CENTS: i64 = 100_000;

/// Score a task against the current system context. Pure: no I/O, no mutation.
pub fn score_priority(task: &Task, ctx: &SystemContext, now: DateTime<Utc>) -> PriorityScore {
    let urgency = urgency(task, now);
    let business_impact = business_impact(task);
    let resource_efficiency = resource_efficiency(task, ctx);
    let revenue_impact = revenue_impact(task);
    let dependency = dependency(task, ctx);

    let composite = (WEIGHT_URGENCY * urgency
        + WEIGHT_BUSINESS * business_impact
        + WEIGHT_EFFICIENCY * resource_efficiency
        + WEIGHT_REVENUE * revenue_impact
        + WEIGHT_DEPENDENCY * dependency)
        .clamp(0.0, 100.0);

    let has_deadline_under_48h = task.hours_to_deadline(now).map(|h| h <= 48.0).unwrap_or(false);
    let has_dependencies = !task.requirements.dependency_ids.is_empty();
    let revenue_potential_over_1000 = task
        .revenue_potential
        .map(|p| p.to_cents() >= HIGH_VALUE_MONITORING_FLOOR_CENTS)
        .unwrap_or(false);
    let triggers = PriorityScore::triggers_for(has_deadline_under_48h, has_dependencies, revenue_potential_over_1000);

    PriorityScore {
        composite,
        urgency,
        business_impact,
        resource_efficiency,
        revenue_impact,
        dependency,
        computed_at: now,
        triggers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskComplexity, TaskRequirements};
    use serde_json::json;

    fn base_task(deadline_hours: Option<f64>, now: DateTime<Utc>) -> Task {
        Task::new(
            "t1",
            "title",
            "desc",
            "generic",
            TaskComplexity::Medium,
            50,
            TaskRequirements::default(),
            json!({}),
            now,
            deadline_hours.map(|h| now + chrono::Duration::minutes((h * 60.0) as i64)),
            4.0,
        )
    }

    #[test]
    fn urgency_increases_as_deadline_approaches() {
        let now = Utc::now();
        let ctx = SystemContext::default();
        let far = score_priority(&base_task(Some(168.0), now), &ctx, now);
        let near = score_priority(&base_task(Some(1.0), now), &ctx, now);
        assert!(near.urgency >= far.urgency);
    }

    #[test]
    fn no_deadline_uses_default_urgency_base() {
        let now = Utc::now();
        let ctx = SystemContext::default();
        let score = score_priority(&base_task(None, now), &ctx, now);
        assert!((score.urgency - 30.0).abs() < 1e-9);
    }

    #[test]
    fn composite_is_clamped_to_0_100() {
        let now = Utc::now();
        let ctx = SystemContext::default();
        let score = score_priority(&base_task(Some(1.0), now), &ctx, now);
        assert!(score.composite >= 0.0 && score.composite <= 100.0);
    }

    #[test]
    fn triggers_reflect_deadline_proximity() {
        use crate::models::priority::RecomputeTrigger;
        let now = Utc::now();
        let ctx = SystemContext::default();
        let near = score_priority(&base_task(Some(10.0), now), &ctx, now);
        assert!(near.triggers.contains(&RecomputeTrigger::HourlyDeadlineCheck));
        let far = score_priority(&base_task(Some(200.0), now), &ctx, now);
        assert!(far.triggers.contains(&RecomputeTrigger::DailyDeadlineCheck));
    }
}
