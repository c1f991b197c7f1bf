//! Ledger accounts.
//!
//! Mirrors the balance discipline of the teacher's `Agent`: an exact integer
//! balance, mutated only through checked arithmetic, never observed mid-update.

use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four account classes named in the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountType {
    PrimaryRevenue,
    OperationalExpense,
    Reserve,
    Investment,
}

impl AccountType {
    /// Only operational-expense accounts may carry a negative balance
    /// (open question §9, resolved: investment stays strict).
    pub fn allows_negative_balance(self) -> bool {
        matches!(self, AccountType::OperationalExpense)
    }
}

/// Account lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountStatus {
    Active,
    Closed,
}

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance: Money,
    pub currency: String,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Build a freshly bootstrapped account with zero balance-history.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        opening_balance: Money,
        currency: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Account {
            id: id.into(),
            name: name.into(),
            account_type,
            balance: opening_balance,
            currency: currency.into(),
            status: AccountStatus::Active,
            created_at: now,
            last_transaction_at: None,
        }
    }

    /// Whether `balance` is a value this account's type permits.
    pub fn balance_is_valid(&self) -> bool {
        self.account_type.allows_negative_balance() || !self.balance.is_negative()
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}
