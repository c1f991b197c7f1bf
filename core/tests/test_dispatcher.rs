use agency_ops_core::clock::{Clock, FixedClock};
use agency_ops_core::config::Config;
use agency_ops_core::dispatch::dispatcher::CompletionReport;
use agency_ops_core::dispatch::SystemContext;
use agency_ops_core::models::task::{Task, TaskComplexity, TaskRequirements};
use agency_ops_core::models::worker::WorkerProfile;
use agency_ops_core::money::Money;
use agency_ops_core::System;
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn task(id: &str, required: &[&str]) -> Task {
    let now = Utc::now();
    let mut req = TaskRequirements::default();
    req.required_capabilities = required.iter().map(|s| s.to_string()).collect();
    Task::new(id, id, "d", "generic", TaskComplexity::Medium, 50, req, json!({}), now, None, 2.0)
}

#[test]
fn dispatcher_assigns_and_records_revenue_on_completion() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
    let system = System::bootstrap_with_clock(Config::default(), clock).unwrap();

    let ctx = SystemContext::default();
    system.dispatcher.submit(task("t1", &["technical"]), &ctx).unwrap();

    let mut worker = WorkerProfile::new("w1", "technical", vec!["technical".to_string()], 2, now);
    worker.proficiencies.insert("technical".to_string(), 0.8);
    system.workers.register(worker);

    let notices = system.dispatcher.run_cycle(&ctx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].task.id, "t1");

    system
        .dispatcher
        .observe_completion(
            CompletionReport {
                task_id: "t1".to_string(),
                worker_id: "w1".to_string(),
                succeeded: true,
                completion_hours: 1.5,
                deliverables: json!({ "report": "ok" }),
                quality_metrics: HashMap::from([("accuracy".to_string(), 0.95)]),
                revenue_amount: Some(Money::from_major_minor(1000, 0)),
                cost_amount: None,
                failure_reason: None,
            },
            &ctx,
        )
        .unwrap();

    let revenue_account = system.accounts.get("primary-revenue").unwrap();
    assert_eq!(revenue_account.balance.to_cents(), 100_000);
    assert_eq!(system.workers.get("w1").unwrap().current_workload, 0);
    assert_eq!(system.tasks.get("t1").unwrap().status, agency_ops_core::models::task::TaskStatus::Completed);
}

#[test]
fn queue_throttles_once_high_water_reached() {
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
    let mut config = Config::default();
    config.queue_high_water = 1;
    let system = System::bootstrap_with_clock(config, clock).unwrap();
    let ctx = SystemContext::default();

    system.dispatcher.submit(task("t1", &[]), &ctx).unwrap();
    let err = system.dispatcher.submit(task("t2", &[]), &ctx);
    assert!(err.is_err());
}
