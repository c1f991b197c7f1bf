//! Configuration surface.
//!
//! One plain struct, constructed once and threaded through the components
//! that need it, the same way the teacher's `OrchestratorConfig`/`CostRates`
//! carried every tunable rate instead of scattering literals through the
//! simulation. Loading this from YAML/env and wiring it up to a CLI is out of
//! scope for this crate (see spec §1); callers fill it in however they like.

use serde::{Deserialize, Serialize};

/// All tunables named in the external-interfaces configuration surface,
/// plus the fraud-screen weights the design notes ask to be configuration
/// rather than literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Interval between full priority-queue rebalances.
    pub queue_rebalance_interval_secs: u64,

    /// How long the dispatcher waits for a worker to acknowledge an assignment.
    pub assignment_timeout_secs: u64,

    /// Heartbeat staleness window; a worker silent longer than this is unavailable.
    pub heartbeat_staleness_secs: u64,

    /// Minimum compatibility composite required to commit an assignment.
    pub compatibility_floor: f64,

    /// Queue depth at which `submit` starts returning `Throttled`.
    pub queue_high_water: usize,

    /// Fraud screen: amount above which the large-amount rule fires, in cents.
    pub max_single_txn_cents: i64,

    /// Fraud screen: daily validated total above which the daily-total rule fires, in cents.
    pub max_daily_txn_cents: i64,

    /// Static validation: minimum transaction amount, in cents.
    pub min_txn_amount_cents: i64,

    /// Static validation: maximum transaction amount, in cents.
    pub max_txn_amount_cents: i64,

    /// Where the durable store persists its snapshot. `None` keeps everything in memory.
    pub store_path: Option<String>,

    /// ISO 4217 currency code applied to bootstrap accounts.
    pub default_currency: String,

    /// Default `max_concurrent_capacity` for newly registered workers that don't specify one.
    pub worker_capacity_default: usize,

    /// Whether a failed credit leg of a `transfer` is automatically compensated
    /// with a reversing credit on the debited account (open question, §9).
    pub auto_compensate_failed_transfers: bool,

    /// Fraud screen rule weights.
    pub fraud_large_amount_weight: u32,
    pub fraud_daily_total_weight: u32,
    pub fraud_rapid_succession_weight: u32,
    pub fraud_round_amount_weight: u32,
    pub fraud_unusual_time_weight: u32,

    /// Fraud screen: number of validated transactions within the rapid-succession
    /// window that trigger the rapid-succession rule.
    pub fraud_rapid_succession_count: usize,

    /// Fraud screen: rapid-succession lookback window.
    pub fraud_rapid_succession_window_secs: u64,

    /// Risk score thresholds: `>= high` is `high` risk, `>= medium` is `medium` risk.
    pub fraud_high_risk_threshold: u32,
    pub fraud_medium_risk_threshold: u32,

    /// Bounded ring size for a worker's rolling experience log.
    pub worker_experience_log_capacity: usize,

    /// Number of distinct-worker failures before a task is terminally failed.
    pub max_task_failures: u8,

    /// Consecutive-error threshold past which a worker is excluded from
    /// dispatch until a success resets its streak (§7 "taken out of rotation").
    pub worker_error_streak_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue_rebalance_interval_secs: 300,
            assignment_timeout_secs: 60,
            heartbeat_staleness_secs: 600,
            compatibility_floor: 0.35,
            queue_high_water: 1000,
            max_single_txn_cents: 10_000_00,
            max_daily_txn_cents: 25_000_00,
            min_txn_amount_cents: 1,
            max_txn_amount_cents: 100_000_00,
            store_path: None,
            default_currency: "USD".to_string(),
            worker_capacity_default: 3,
            auto_compensate_failed_transfers: true,
            fraud_large_amount_weight: 30,
            fraud_daily_total_weight: 25,
            fraud_rapid_succession_weight: 20,
            fraud_round_amount_weight: 5,
            fraud_unusual_time_weight: 10,
            fraud_rapid_succession_count: 5,
            fraud_rapid_succession_window_secs: 300,
            fraud_high_risk_threshold: 50,
            fraud_medium_risk_threshold: 25,
            worker_experience_log_capacity: 100,
            max_task_failures: 3,
            worker_error_streak_threshold: 3,
        }
    }
}
