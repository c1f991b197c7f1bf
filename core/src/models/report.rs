//! Period-scoped financial aggregates.
//!
//! Grounded on `financial_infrastructure.py`'s `FinancialReport`: a flat,
//! write-once aggregate with no attached rendering — prose/templating is out
//! of scope (§1 Non-goals), this is structured data only.

use crate::money::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A completed aggregation over all `validated` transactions in `[period_start, period_end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,

    pub total_revenue: Money,
    pub total_expense: Money,
    /// `total_revenue - total_expense`.
    pub profit: Money,
    /// `profit / total_revenue`; `0.0` when `total_revenue` is zero.
    pub margin: f64,

    pub cash_inflow: Money,
    pub cash_outflow: Money,

    /// Net cash flow per calendar date within the period.
    pub daily_cash_flow: HashMap<NaiveDate, Money>,

    pub expense_by_category: HashMap<String, Money>,
    pub expense_by_worker: HashMap<String, Money>,
    pub expense_by_project: HashMap<String, Money>,

    pub revenue_by_subcategory: HashMap<String, Money>,
    pub revenue_by_correlation: HashMap<String, Money>,
}

/// The headline figures carried on the `report-ready` stakeholder event —
/// the full breakdown maps stay in the stored `Report`, not the notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_revenue: Money,
    pub total_expense: Money,
    pub profit: Money,
    pub margin: f64,
}

impl Report {
    /// `profit / total_revenue`, or `0.0` when revenue is zero (spec §4.9: "undefined → 0").
    pub fn compute_margin(total_revenue: Money, profit: Money) -> f64 {
        if total_revenue.to_cents() == 0 {
            0.0
        } else {
            profit.to_cents() as f64 / total_revenue.to_cents() as f64
        }
    }

    /// The lightweight headline summary for the `report-ready` event.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_revenue: self.total_revenue,
            total_expense: self.total_expense,
            profit: self.profit,
            margin: self.margin,
        }
    }
}
