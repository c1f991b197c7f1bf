use agency_ops_core::dispatch::{score_priority, SystemContext};
use agency_ops_core::models::task::{StakeholderLevel, StrategicImportance, Task, TaskComplexity, TaskRequirements};
use chrono::Utc;
use serde_json::json;

fn task(deadline_hours: Option<f64>, base_priority: u8) -> Task {
    let now = Utc::now();
    Task::new(
        "t1",
        "title",
        "desc",
        "generic",
        TaskComplexity::Medium,
        base_priority,
        TaskRequirements::default(),
        json!({}),
        now,
        deadline_hours.map(|h| now + chrono::Duration::minutes((h * 60.0) as i64)),
        4.0,
    )
}

#[test]
fn priority_monotonicity_as_deadline_approaches() {
    let ctx = SystemContext::default();
    let now = Utc::now();
    let far = score_priority(&task(Some(168.0), 50), &ctx, now);
    let medium = score_priority(&task(Some(24.0), 50), &ctx, now);
    let near = score_priority(&task(Some(2.0), 50), &ctx, now);
    assert!(near.urgency >= medium.urgency);
    assert!(medium.urgency >= far.urgency);
}

#[test]
fn business_impact_scales_with_strategic_and_stakeholder_multipliers() {
    let ctx = SystemContext::default();
    let now = Utc::now();
    let mut low = task(None, 50);
    low.requirements.strategic_importance = Some(StrategicImportance::Low);
    low.requirements.stakeholder_level = Some(StakeholderLevel::Team);

    let mut high = task(None, 50);
    high.requirements.strategic_importance = Some(StrategicImportance::Critical);
    high.requirements.stakeholder_level = Some(StakeholderLevel::Ceo);

    let low_score = score_priority(&low, &ctx, now);
    let high_score = score_priority(&high, &ctx, now);
    assert!(high_score.business_impact > low_score.business_impact);
}

#[test]
fn composite_always_within_0_100() {
    let ctx = SystemContext::default();
    let now = Utc::now();
    for hours in [None, Some(0.5), Some(12.0), Some(500.0)] {
        let score = score_priority(&task(hours, 90), &ctx, now);
        assert!((0.0..=100.0).contains(&score.composite));
    }
}
