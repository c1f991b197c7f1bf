//! Dispatcher.
//!
//! The orchestration loop in §4.7, generalized from the teacher's fixed-tick
//! `orchestrator/engine.rs` loop (arrivals → policy → settle → cost accrual →
//! events → advance) into an event-driven cycle: observe idle workers →
//! dequeue optimal task → compatibility gate → commit assignment, plus a
//! separate completion-intake path fed by a `crossbeam-channel` result
//! channel, matching the message-passing design note in §9.

use crate::clock::Clock;
use crate::config::Config;
use crate::dispatch::capability::score_compatibility;
use crate::dispatch::priority_engine::{score_priority, SystemContext};
use crate::dispatch::queue::PriorityQueue;
use crate::dispatch::task_registry::TaskRegistry;
use crate::dispatch::worker_registry::WorkerRegistry;
use crate::error::SystemError;
use crate::events::StakeholderEvent;
use crate::ledger::processor::TransactionProcessor;
use crate::models::assignment::Assignment;
use crate::models::task::{Task, TaskStatus};
use crate::models::transaction::{Transaction, TransactionCategory, TransactionDirection};
use crate::models::worker::ExperienceEntry;
use crate::money::Money;
use chrono::{DateTime, Utc};
use crossbeam_channel::Sender;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Sent to the host once a task has been committed to a worker, so the host
/// can hand it to the worker's `process()` on its own thread.
#[derive(Debug, Clone)]
pub struct AssignmentNotice {
    pub task: Task,
    pub assignment: Assignment,
}

/// What the host reports back once a worker finishes (or fails) a task.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub task_id: String,
    pub worker_id: String,
    pub succeeded: bool,
    pub completion_hours: f64,
    /// The worker's produced output, forwarded verbatim on `task-completed`.
    pub deliverables: Value,
    /// Named quality measurements, forwarded verbatim on `task-completed` and
    /// averaged internally to update the worker's rolling `quality_mean`.
    pub quality_metrics: HashMap<String, f64>,
    /// Present for revenue-bearing completions; posted as a credit against
    /// the primary-revenue account.
    pub revenue_amount: Option<Money>,
    /// Present for cost-bearing events; posted as a debit against the
    /// operational-expense account.
    pub cost_amount: Option<Money>,
    pub failure_reason: Option<String>,
}

/// Turns submitted tasks and a worker population into assignments.
pub struct Dispatcher {
    queue: Mutex<PriorityQueue>,
    workers: Arc<WorkerRegistry>,
    tasks: Arc<TaskRegistry>,
    processor: Arc<TransactionProcessor>,
    clock: Arc<dyn Clock>,
    config: Config,
    primary_revenue_account_id: String,
    operational_expense_account_id: String,
    assignments: Mutex<HashMap<String, Assignment>>,
    /// Distinct worker ids a task has failed on, keyed by task id; backs the
    /// three-strikes terminal-failure rule (§4.7). Cleared once a task either
    /// succeeds or is terminally failed.
    failed_workers: Mutex<HashMap<String, Vec<String>>>,
    assignment_notices: Sender<AssignmentNotice>,
    stakeholder_events: Sender<StakeholderEvent>,
    next_txn_id: Mutex<u64>,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workers: Arc<WorkerRegistry>,
        tasks: Arc<TaskRegistry>,
        processor: Arc<TransactionProcessor>,
        clock: Arc<dyn Clock>,
        config: Config,
        primary_revenue_account_id: impl Into<String>,
        operational_expense_account_id: impl Into<String>,
        assignment_notices: Sender<AssignmentNotice>,
        stakeholder_events: Sender<StakeholderEvent>,
    ) -> Self {
        Dispatcher {
            queue: Mutex::new(PriorityQueue::new()),
            workers,
            tasks,
            processor,
            clock,
            config,
            primary_revenue_account_id: primary_revenue_account_id.into(),
            operational_expense_account_id: operational_expense_account_id.into(),
            assignments: Mutex::new(HashMap::new()),
            failed_workers: Mutex::new(HashMap::new()),
            assignment_notices,
            stakeholder_events,
            next_txn_id: Mutex::new(0),
        }
    }

    fn next_txn_id(&self) -> String {
        let mut guard = self.next_txn_id.lock().expect("txn id counter poisoned");
        *guard += 1;
        format!("dispatcher-txn-{}", *guard)
    }

    /// Re-score a registered task and put it back on the queue, updating the
    /// registry's copy to match. `urgency_boost` scales the freshly computed
    /// composite; `1.0` leaves it untouched, a higher value is the "boosted
    /// urgency" aging factor §4.7 calls for on a stale-worker reclaim. A task
    /// no longer in the registry (already removed, already terminal) is a
    /// silent no-op.
    fn requeue_task(&self, task_id: &str, ctx: &SystemContext, now: DateTime<Utc>, urgency_boost: f64) {
        let Some(mut task) = self.tasks.get(task_id) else {
            return;
        };
        let mut score = score_priority(&task, ctx, now);
        score.composite = (score.composite * urgency_boost).min(100.0);
        task.status = TaskStatus::Pending;
        task.priority = Some(score.clone());
        self.tasks.mutate(task_id, |t| {
            t.status = TaskStatus::Pending;
            t.priority = Some(score.clone());
        });
        self.queue.lock().expect("queue lock poisoned").enqueue(task, score.composite);
    }

    /// `submit(description, requirements, deadline?, basePriority) → taskId | error` (§6).
    /// Returns `Throttled` once queue depth reaches the configured high-water mark.
    pub fn submit(&self, task: Task, ctx: &SystemContext) -> Result<String, SystemError> {
        let mut queue = self.queue.lock().expect("queue lock poisoned");
        if queue.depth() >= self.config.queue_high_water {
            self.stakeholder_events
                .send(StakeholderEvent::LoadWarning {
                    queue_depth: queue.depth(),
                    reason: "queue depth at high water".to_string(),
                    at: self.clock.now(),
                })
                .ok();
            return Err(SystemError::Throttled {
                depth: queue.depth(),
                high_water: self.config.queue_high_water,
            });
        }
        let now = self.clock.now();
        let score = score_priority(&task, ctx, now);
        let task_id = task.id.clone();
        let mut task = task;
        task.priority = Some(score.clone());
        self.tasks.insert(task.clone());
        queue.enqueue(task, score.composite);
        Ok(task_id)
    }

    /// One dispatch cycle: for each idle, fresh-heartbeat worker (by remaining
    /// capacity descending), try to commit its best compatible task.
    pub fn run_cycle(&self, ctx: &SystemContext) -> Vec<AssignmentNotice> {
        let now = self.clock.now();
        let available = self.workers.available_by_capacity(
            now,
            self.config.heartbeat_staleness_secs,
            self.config.worker_error_streak_threshold,
        );
        let mut notices = Vec::new();

        for worker in available {
            let mut queue = self.queue.lock().expect("queue lock poisoned");
            let Some(task) = queue.dequeue_optimal(&worker) else {
                continue;
            };
            drop(queue);

            let compatibility = score_compatibility(&task, &worker, now);
            if compatibility.composite < self.config.compatibility_floor {
                let composite = task.priority.as_ref().map(|p| p.composite).unwrap_or(0.0);
                self.queue.lock().expect("queue lock poisoned").requeue(task, composite);
                continue;
            }

            let mut assigned_task = task.clone();
            assigned_task.status = TaskStatus::Assigned;
            let estimated_completion = now
                + chrono::Duration::minutes((assigned_task.estimated_effort_hours * 60.0) as i64);
            let assignment = Assignment::new(
                assigned_task.id.clone(),
                worker.id.clone(),
                now,
                estimated_completion,
                compatibility.composite,
                compatibility.reasoning.clone(),
            );

            self.workers.mutate(&worker.id, |w| {
                w.current_workload += 1;
                w.current_task_ids.push(assigned_task.id.clone());
            });
            self.tasks.mutate(&assigned_task.id, |t| {
                t.status = TaskStatus::Assigned;
            });
            self.assignments
                .lock()
                .expect("assignments lock poisoned")
                .insert(assigned_task.id.clone(), assignment.clone());

            self.stakeholder_events
                .send(StakeholderEvent::TaskAccepted {
                    task_id: assigned_task.id.clone(),
                    worker_id: worker.id.clone(),
                    estimated_completion,
                    at: now,
                })
                .ok();

            let notice = AssignmentNotice {
                task: assigned_task,
                assignment,
            };
            self.assignment_notices.send(notice.clone()).ok();
            notices.push(notice);
        }

        notices
    }

    /// Process a worker's completion report: update metrics, append
    /// experience, transition the task's registered status, post
    /// revenue/cost transactions, emit stakeholder events.
    ///
    /// On failure, the task is re-enqueued unless it has now failed on
    /// `Config::max_task_failures` distinct workers, in which case it's
    /// transitioned to terminal `failed` and not retried (§4.7).
    pub fn observe_completion(&self, report: CompletionReport, ctx: &SystemContext) -> Result<(), SystemError> {
        let now = self.clock.now();
        self.assignments.lock().expect("assignments lock poisoned").remove(&report.task_id);

        let quality_scalar = if report.quality_metrics.is_empty() {
            if report.succeeded { 1.0 } else { 0.0 }
        } else {
            report.quality_metrics.values().sum::<f64>() / report.quality_metrics.len() as f64
        };

        self.workers.mutate(&report.worker_id, |w| {
            w.current_workload = w.current_workload.saturating_sub(1);
            w.current_task_ids.retain(|t| t != &report.task_id);

            let n = w.experience_log.len().max(1) as f64;
            if report.succeeded {
                w.metrics.success_rate = (w.metrics.success_rate * n + 1.0) / (n + 1.0);
                w.metrics.error_rate = (w.metrics.error_rate * n) / (n + 1.0);
                w.error_streak = 0;
            } else {
                w.metrics.success_rate = (w.metrics.success_rate * n) / (n + 1.0);
                w.metrics.error_rate = (w.metrics.error_rate * n + 1.0) / (n + 1.0);
                w.error_streak += 1;
            }
            w.metrics.avg_completion_hours =
                (w.metrics.avg_completion_hours * n + report.completion_hours) / (n + 1.0);
            w.metrics.quality_mean = (w.metrics.quality_mean * n + quality_scalar) / (n + 1.0);

            w.record_experience(ExperienceEntry {
                task_type: String::new(),
                complexity: crate::models::task::TaskComplexity::Medium,
                domain: String::new(),
                success_score: if report.succeeded { quality_scalar } else { 0.0 },
                completion_hours: report.completion_hours,
                recorded_at: now,
            });
        });

        let mut terminal_failed = false;
        if report.succeeded {
            self.failed_workers.lock().expect("failed-workers lock poisoned").remove(&report.task_id);
            self.tasks.mutate(&report.task_id, |t| {
                t.status = TaskStatus::Completed;
            });
            self.stakeholder_events
                .send(StakeholderEvent::TaskCompleted {
                    task_id: report.task_id.clone(),
                    worker_id: report.worker_id.clone(),
                    deliverables: report.deliverables.clone(),
                    quality_metrics: report.quality_metrics.clone(),
                    at: now,
                })
                .ok();
        } else {
            let distinct_failures = {
                let mut failures = self.failed_workers.lock().expect("failed-workers lock poisoned");
                let workers_failed = failures.entry(report.task_id.clone()).or_default();
                if !workers_failed.contains(&report.worker_id) {
                    workers_failed.push(report.worker_id.clone());
                }
                workers_failed.len() as u8
            };
            terminal_failed = distinct_failures >= self.config.max_task_failures;

            self.tasks.mutate(&report.task_id, |t| {
                t.failure_count = distinct_failures;
                t.status = if terminal_failed { TaskStatus::Failed } else { TaskStatus::Pending };
            });

            self.stakeholder_events
                .send(StakeholderEvent::TaskFailed {
                    task_id: report.task_id.clone(),
                    worker_id: report.worker_id.clone(),
                    reason: report.failure_reason.clone().unwrap_or_default(),
                    terminal: terminal_failed,
                    at: now,
                })
                .ok();

            if terminal_failed {
                self.failed_workers.lock().expect("failed-workers lock poisoned").remove(&report.task_id);
            } else {
                self.requeue_task(&report.task_id, ctx, now, 1.0);
            }
        }

        if let Some(amount) = report.revenue_amount {
            let txn = Transaction::new_pending(
                self.next_txn_id(),
                self.primary_revenue_account_id.clone(),
                TransactionDirection::Credit,
                amount,
                TransactionCategory::Revenue,
                format!("revenue for task {}", report.task_id),
                now,
            );
            if let Err(e) = self.processor.submit_transaction(txn) {
                warn!(task_id = %report.task_id, error = %e, "revenue posting failed");
            }
        }
        if let Some(amount) = report.cost_amount {
            let txn = Transaction::new_pending(
                self.next_txn_id(),
                self.operational_expense_account_id.clone(),
                TransactionDirection::Debit,
                amount,
                TransactionCategory::AgentCost,
                format!("cost for task {}", report.task_id),
                now,
            );
            if let Err(e) = self.processor.submit_transaction(txn) {
                warn!(task_id = %report.task_id, error = %e, "cost posting failed");
            }
        }

        info!(task_id = %report.task_id, worker_id = %report.worker_id, succeeded = report.succeeded, "task completion observed");
        Ok(())
    }

    /// Mark workers with a stale heartbeat unavailable: their in-flight
    /// assignments are dropped, the tasks re-enqueued with boosted urgency
    /// (aging factor applied immediately), and the worker's workload/task-id
    /// bookkeeping reset to idle (§4.7 failure semantics).
    pub fn reclaim_stale_workers(&self, ctx: &SystemContext) {
        const STALE_URGENCY_BOOST: f64 = 1.5;
        let now = self.clock.now();
        for worker in self.workers.stale(now, self.config.heartbeat_staleness_secs) {
            let task_ids = worker.current_task_ids.clone();
            for task_id in &task_ids {
                if self.assignments.lock().expect("assignments lock poisoned").remove(task_id).is_some() {
                    warn!(worker_id = %worker.id, task_id = %task_id, "worker heartbeat stale, reclaiming assignment");
                    self.requeue_task(task_id, ctx, now, STALE_URGENCY_BOOST);
                }
            }
            self.workers.mutate(&worker.id, |w| {
                w.current_workload = 0;
                w.current_task_ids.clear();
            });
            self.stakeholder_events
                .send(StakeholderEvent::LoadWarning {
                    queue_depth: self.queue_depth(),
                    reason: format!("worker {} stale, {} task(s) reclaimed", worker.id, task_ids.len()),
                    at: now,
                })
                .ok();
        }
    }

    /// Revoke assignments the worker failed to acknowledge within
    /// `Config::assignment_timeout_secs`: drop the assignment, re-enqueue the
    /// task at its normally-scored priority, reset the worker's workload for
    /// that task, and mark the worker suspect by counting the timeout against
    /// its error streak (§5 "cancellation and timeouts").
    pub fn reclaim_timed_out_assignments(&self, ctx: &SystemContext) {
        let now = self.clock.now();
        let timeout = chrono::Duration::seconds(self.config.assignment_timeout_secs as i64);
        let timed_out: Vec<Assignment> = {
            let assignments = self.assignments.lock().expect("assignments lock poisoned");
            assignments
                .values()
                .filter(|a| now.signed_duration_since(a.assigned_at) > timeout)
                .cloned()
                .collect()
        };

        for assignment in timed_out {
            self.assignments.lock().expect("assignments lock poisoned").remove(&assignment.task_id);
            self.workers.mutate(&assignment.worker_id, |w| {
                w.current_workload = w.current_workload.saturating_sub(1);
                w.current_task_ids.retain(|t| t != &assignment.task_id);
                w.error_streak += 1;
            });
            warn!(task_id = %assignment.task_id, worker_id = %assignment.worker_id, "assignment timed out, worker marked suspect");
            self.requeue_task(&assignment.task_id, ctx, now, 1.0);

            self.stakeholder_events
                .send(StakeholderEvent::LoadWarning {
                    queue_depth: self.queue_depth(),
                    reason: format!(
                        "assignment timed out for task {} worker {}",
                        assignment.task_id, assignment.worker_id
                    ),
                    at: now,
                })
                .ok();
        }
    }

    /// Recompute every queued task's composite and re-heapify (§4.5 `rebalance`).
    pub fn rebalance(&self, ctx: &SystemContext) {
        self.queue.lock().expect("queue lock poisoned").rebalance(ctx, self.clock.now());
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.lock().expect("queue lock poisoned").depth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::account_registry::AccountRegistry;
    use crate::ledger::store::InMemoryStore;
    use crate::ledger::store::Store;
    use crate::models::account::{Account, AccountStatus, AccountType};
    use crate::models::task::{TaskComplexity, TaskRequirements};
    use chrono::TimeZone;
    use serde_json::json;

    fn build() -> (Dispatcher, crossbeam_channel::Receiver<AssignmentNotice>, DateTime<Utc>) {
        build_with_config(Config::default())
    }

    fn build_with_config(
        config: Config,
    ) -> (Dispatcher, crossbeam_channel::Receiver<AssignmentNotice>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let accounts = Arc::new(AccountRegistry::bootstrap(store.clone()).unwrap());
        accounts
            .create(Account {
                id: "rev".to_string(),
                name: "Primary Revenue".to_string(),
                account_type: AccountType::PrimaryRevenue,
                balance: Money::ZERO,
                currency: "USD".to_string(),
                status: AccountStatus::Active,
                created_at: now,
                last_transaction_at: None,
            })
            .unwrap();
        accounts
            .create(Account {
                id: "opex".to_string(),
                name: "Operational Expense".to_string(),
                account_type: AccountType::OperationalExpense,
                balance: Money::ZERO,
                currency: "USD".to_string(),
                status: AccountStatus::Active,
                created_at: now,
                last_transaction_at: None,
            })
            .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        let processor = Arc::new(TransactionProcessor::new(store, accounts, clock.clone(), config.clone()));
        let workers = Arc::new(WorkerRegistry::new());
        let tasks = Arc::new(TaskRegistry::new());
        let (notice_tx, notice_rx) = crossbeam_channel::unbounded();
        let (event_tx, _event_rx) = crossbeam_channel::unbounded();
        let dispatcher = Dispatcher::new(workers, tasks, processor, clock, config, "rev", "opex", notice_tx, event_tx);
        (dispatcher, notice_rx, now)
    }

    fn task(id: &str, now: DateTime<Utc>, required: &[&str]) -> Task {
        let mut req = TaskRequirements::default();
        req.required_capabilities = required.iter().map(|s| s.to_string()).collect();
        Task::new(id, id, "d", "generic", TaskComplexity::Medium, 50, req, json!({}), now, None, 2.0)
    }

    #[test]
    fn submit_throttles_at_high_water() {
        let mut config = Config::default();
        config.queue_high_water = 1;
        let (dispatcher, _rx, now) = build_with_config(config);
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();
        let err = dispatcher.submit(task("t2", now, &[]), &ctx).unwrap_err();
        assert!(matches!(err, SystemError::Throttled { .. }));
    }

    #[test]
    fn run_cycle_assigns_compatible_worker() {
        let (dispatcher, rx, now) = build();
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &["programming"]), &ctx).unwrap();

        let mut worker = crate::models::worker::WorkerProfile::new(
            "w1",
            "technical",
            vec!["programming".to_string()],
            3,
            now,
        );
        worker.proficiencies.insert("programming".to_string(), 0.9);
        dispatcher.workers.register(worker);

        let notices = dispatcher.run_cycle(&ctx);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].task.id, "t1");
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn observe_completion_posts_revenue() {
        let (dispatcher, _rx, now) = build();
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();
        let mut worker = crate::models::worker::WorkerProfile::new("w1", "technical", vec![], 3, now);
        worker.proficiencies.insert("x".to_string(), 0.5);
        dispatcher.workers.register(worker);
        dispatcher.run_cycle(&ctx);

        dispatcher
            .observe_completion(
                CompletionReport {
                    task_id: "t1".to_string(),
                    worker_id: "w1".to_string(),
                    succeeded: true,
                    completion_hours: 1.0,
                    deliverables: json!({ "summary": "done" }),
                    quality_metrics: HashMap::from([("accuracy".to_string(), 0.9)]),
                    revenue_amount: Some(Money::from_major_minor(500, 0)),
                    cost_amount: None,
                    failure_reason: None,
                },
                &ctx,
            )
            .unwrap();

        let worker_after = dispatcher.workers.get("w1").unwrap();
        assert_eq!(worker_after.current_workload, 0);
        assert_eq!(worker_after.error_streak, 0);
        let task_after = dispatcher.tasks.get("t1").unwrap();
        assert_eq!(task_after.status, TaskStatus::Completed);
    }

    #[test]
    fn failure_below_threshold_requeues_with_incremented_failure_count() {
        let (dispatcher, _rx, now) = build();
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();
        let mut worker = crate::models::worker::WorkerProfile::new("w1", "technical", vec![], 3, now);
        worker.proficiencies.insert("x".to_string(), 0.5);
        dispatcher.workers.register(worker);
        dispatcher.run_cycle(&ctx);

        dispatcher
            .observe_completion(
                CompletionReport {
                    task_id: "t1".to_string(),
                    worker_id: "w1".to_string(),
                    succeeded: false,
                    completion_hours: 0.5,
                    deliverables: json!(null),
                    quality_metrics: HashMap::new(),
                    revenue_amount: None,
                    cost_amount: None,
                    failure_reason: Some("worker crashed".to_string()),
                },
                &ctx,
            )
            .unwrap();

        let task_after = dispatcher.tasks.get("t1").unwrap();
        assert_eq!(task_after.failure_count, 1);
        assert_eq!(task_after.status, TaskStatus::Pending);
        assert_eq!(dispatcher.queue_depth(), 1);
    }

    #[test]
    fn failure_on_max_distinct_workers_is_terminal() {
        let mut config = Config::default();
        config.max_task_failures = 2;
        let (dispatcher, _rx, now) = build_with_config(config);
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();

        for worker_id in ["w1", "w2"] {
            let mut worker = crate::models::worker::WorkerProfile::new(worker_id, "technical", vec![], 3, now);
            worker.proficiencies.insert("x".to_string(), 0.5);
            dispatcher.workers.register(worker);
        }
        dispatcher.run_cycle(&ctx);
        dispatcher
            .observe_completion(
                CompletionReport {
                    task_id: "t1".to_string(),
                    worker_id: "w1".to_string(),
                    succeeded: false,
                    completion_hours: 0.5,
                    deliverables: json!(null),
                    quality_metrics: HashMap::new(),
                    revenue_amount: None,
                    cost_amount: None,
                    failure_reason: Some("crash".to_string()),
                },
                &ctx,
            )
            .unwrap();
        dispatcher.run_cycle(&ctx);
        dispatcher
            .observe_completion(
                CompletionReport {
                    task_id: "t1".to_string(),
                    worker_id: "w2".to_string(),
                    succeeded: false,
                    completion_hours: 0.5,
                    deliverables: json!(null),
                    quality_metrics: HashMap::new(),
                    revenue_amount: None,
                    cost_amount: None,
                    failure_reason: Some("crash".to_string()),
                },
                &ctx,
            )
            .unwrap();

        let task_after = dispatcher.tasks.get("t1").unwrap();
        assert_eq!(task_after.failure_count, 2);
        assert_eq!(task_after.status, TaskStatus::Failed);
        assert_eq!(dispatcher.queue_depth(), 0);
    }

    #[test]
    fn reclaim_stale_workers_requeues_tasks_and_resets_worker() {
        let (mut dispatcher, _rx, now) = build();
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();
        let mut worker = crate::models::worker::WorkerProfile::new("w1", "technical", vec![], 3, now);
        worker.proficiencies.insert("x".to_string(), 0.5);
        dispatcher.workers.register(worker);
        dispatcher.run_cycle(&ctx);
        assert_eq!(dispatcher.queue_depth(), 0);

        let later = now + chrono::Duration::seconds(dispatcher.config.heartbeat_staleness_secs as i64 + 60);
        dispatcher.clock = Arc::new(FixedClock::new(later));
        dispatcher.reclaim_stale_workers(&ctx);

        assert_eq!(dispatcher.queue_depth(), 1);
        let worker_after = dispatcher.workers.get("w1").unwrap();
        assert_eq!(worker_after.current_workload, 0);
        assert!(worker_after.current_task_ids.is_empty());
        let task_after = dispatcher.tasks.get("t1").unwrap();
        assert_eq!(task_after.status, TaskStatus::Pending);
    }

    #[test]
    fn reclaim_timed_out_assignments_requeues_and_marks_worker_suspect() {
        let (mut dispatcher, _rx, now) = build();
        let ctx = SystemContext::default();
        dispatcher.submit(task("t1", now, &[]), &ctx).unwrap();
        let mut worker = crate::models::worker::WorkerProfile::new("w1", "technical", vec![], 3, now);
        worker.proficiencies.insert("x".to_string(), 0.5);
        dispatcher.workers.register(worker);
        dispatcher.run_cycle(&ctx);

        let later = now + chrono::Duration::seconds(dispatcher.config.assignment_timeout_secs as i64 + 60);
        dispatcher.clock = Arc::new(FixedClock::new(later));
        dispatcher.reclaim_timed_out_assignments(&ctx);

        assert_eq!(dispatcher.queue_depth(), 1);
        let worker_after = dispatcher.workers.get("w1").unwrap();
        assert_eq!(worker_after.current_workload, 0);
        assert_eq!(worker_after.error_streak, 1);
    }
}
