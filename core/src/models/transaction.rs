//! Ledger transactions.
//!
//! Follows the teacher's write-once `TransactionStatus` discipline: a
//! transaction's timestamps are immutable once it leaves `pending`, and a
//! `validated` row is never mutated again.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Credit increases the target account's balance, debit decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

/// Transaction categories named in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionCategory {
    Revenue,
    OperationalExpense,
    AgentCost,
    Infrastructure,
    Marketing,
    Development,
    Transfer,
    Investment,
    Distribution,
}

/// Where a transaction sits in the validate→screen→post pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    Pending,
    Validated,
    Rejected,
    RequiresReview,
}

impl ValidationStatus {
    /// Once a transaction leaves `Pending` its timestamps may never change again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ValidationStatus::Pending)
    }
}

/// A single ledger entry against one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub direction: TransactionDirection,
    pub amount: Money,
    pub category: TransactionCategory,
    pub subcategory: Option<String>,
    pub description: String,
    pub external_id: Option<String>,
    pub task_id: Option<String>,
    pub project_id: Option<String>,
    pub worker_id: Option<String>,
    /// Shared by the two legs of a `transfer`.
    pub reference: Option<String>,
    pub transaction_time: DateTime<Utc>,
    pub processed_time: Option<DateTime<Utc>>,
    pub status: ValidationStatus,
    pub metadata: HashMap<String, String>,
}

impl Transaction {
    /// Build a new, unposted (`Pending`) transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn new_pending(
        id: impl Into<String>,
        account_id: impl Into<String>,
        direction: TransactionDirection,
        amount: Money,
        category: TransactionCategory,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: id.into(),
            account_id: account_id.into(),
            direction,
            amount,
            category,
            subcategory: None,
            description: description.into(),
            external_id: None,
            task_id: None,
            project_id: None,
            worker_id: None,
            reference: None,
            transaction_time: now,
            processed_time: None,
            status: ValidationStatus::Pending,
            metadata: HashMap::new(),
        }
    }

    pub fn is_validated(&self) -> bool {
        self.status == ValidationStatus::Validated
    }
}
