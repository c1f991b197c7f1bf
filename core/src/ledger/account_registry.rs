//! Account Registry.
//!
//! The authoritative in-memory balance cache, grounded on
//! `financial_infrastructure.py AccountManager`. Loaded fully at bootstrap
//! from the `Store`; every subsequent mutation is write-through — persisted
//! first, then reflected in memory, never the reverse.

use crate::error::SystemError;
use crate::ledger::store::Store;
use crate::models::{Account, AccountType};
use crate::money::Money;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Per-type balance rollup returned by `summary()`.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTypeSummary {
    pub count: usize,
    pub total_balance: Money,
}

/// In-memory authoritative cache of accounts, write-through to a `Store`.
///
/// Reads take a shared lock over an otherwise-immutable snapshot; the only
/// writer path is `updateBalance`, which the Transaction Processor calls from
/// within its own per-account critical section (§4.2).
pub struct AccountRegistry {
    store: Arc<dyn Store>,
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountRegistry {
    /// Load every account from `store` into memory.
    pub fn bootstrap(store: Arc<dyn Store>) -> Result<Self, SystemError> {
        let loaded = store.load_accounts()?;
        let accounts = loaded.into_iter().map(|a| (a.id.clone(), a)).collect();
        Ok(AccountRegistry {
            store,
            accounts: RwLock::new(accounts),
        })
    }

    /// Create and persist a new account, then add it to the cache.
    pub fn create(&self, account: Account) -> Result<(), SystemError> {
        self.store.upsert_account(&account)?;
        let mut guard = self.accounts.write().expect("account registry lock poisoned");
        guard.insert(account.id.clone(), account);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Account> {
        self.accounts
            .read()
            .expect("account registry lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn list_by_type(&self, account_type: AccountType) -> Vec<Account> {
        self.accounts
            .read()
            .expect("account registry lock poisoned")
            .values()
            .filter(|a| a.account_type == account_type)
            .cloned()
            .collect()
    }

    /// Write `new_balance` through to the store, then reflect it in memory.
    ///
    /// MUST be called only from within the Transaction Processor's per-account
    /// critical section — this method itself does not serialize concurrent
    /// callers for the same account.
    pub fn update_balance(
        &self,
        id: &str,
        new_balance: Money,
        as_of: DateTime<Utc>,
    ) -> Result<(), SystemError> {
        let mut account = self.get(id).ok_or_else(|| SystemError::AccountNotFound {
            account_id: id.to_string(),
        })?;
        account.balance = new_balance;
        account.last_transaction_at = Some(as_of);

        // Persist first; on failure the in-memory copy is left untouched.
        self.store.upsert_account(&account)?;

        let mut guard = self.accounts.write().expect("account registry lock poisoned");
        guard.insert(id.to_string(), account);
        Ok(())
    }

    /// Per-type account counts and balance totals.
    pub fn summary(&self) -> HashMap<AccountType, AccountTypeSummary> {
        let guard = self.accounts.read().expect("account registry lock poisoned");
        let mut summary: HashMap<AccountType, AccountTypeSummary> = HashMap::new();
        for account in guard.values() {
            let entry = summary.entry(account.account_type).or_insert(AccountTypeSummary {
                count: 0,
                total_balance: Money::ZERO,
            });
            entry.count += 1;
            entry.total_balance = entry
                .total_balance
                .checked_add(account.balance)
                .unwrap_or(entry.total_balance);
        }
        summary
    }

    pub fn all(&self) -> Vec<Account> {
        self.accounts
            .read()
            .expect("account registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}
