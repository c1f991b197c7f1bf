//! Transaction Processor.
//!
//! Runs the validate→screen→post pipeline in §4.3. Grounded on the teacher's
//! `settlement/rtgs.rs::try_settle` (reread balance, mutate, write, all inside
//! one critical section) generalized from a two-party settlement to a
//! single-account posting plus a two-leg transfer, and on
//! `financial_infrastructure.py TransactionProcessor` for the validate/screen/
//! decide staging.

use crate::clock::Clock;
use crate::config::Config;
use crate::error::SystemError;
use crate::ledger::account_registry::AccountRegistry;
use crate::ledger::fraud_screen::{screen_transaction, RecentActivity, RiskLevel};
use crate::ledger::store::Store;
use crate::models::transaction::{Transaction, TransactionDirection, ValidationStatus};
use crate::money::Money;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Successful posting outcome: the new balance and when it was posted.
#[derive(Debug, Clone, PartialEq)]
pub struct PostOutcome {
    pub new_balance: Money,
    pub processed_time: DateTime<Utc>,
}

/// The two legs of a successful `transfer`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub debit_id: String,
    pub credit_id: String,
}

/// Owns per-account serialization and drives the posting pipeline. Does not
/// own account state itself — all balance reads/writes go through the
/// `AccountRegistry` it wraps, from within this processor's per-account lock.
pub struct TransactionProcessor {
    store: Arc<dyn Store>,
    accounts: Arc<AccountRegistry>,
    clock: Arc<dyn Clock>,
    config: Config,
    /// One lock per account id. Transfers acquire both locks in ascending
    /// account-id order to avoid deadlock (§5).
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Validated-transaction history, used to assemble the fraud screen's
    /// recent-activity view without the screen itself touching storage.
    history: Mutex<HashMap<String, Vec<Transaction>>>,
    /// Transaction ids already submitted, seeded from `store` at construction
    /// and checked before every posting attempt, guaranteeing at-most-once
    /// posting per id (§8 "exactly-once posting").
    seen_ids: Mutex<HashSet<String>>,
}

impl TransactionProcessor {
    pub fn new(
        store: Arc<dyn Store>,
        accounts: Arc<AccountRegistry>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        let seen_ids = store
            .load_transactions()
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.id)
            .collect();
        TransactionProcessor {
            store,
            accounts,
            clock,
            config,
            locks: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            seen_ids: Mutex::new(seen_ids),
        }
    }

    fn lock_for(&self, account_id: &str) -> Arc<Mutex<()>> {
        let mut guard = self.locks.lock().expect("lock registry poisoned");
        guard
            .entry(account_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn recent_activity(&self, account_id: &str, now: DateTime<Utc>) -> RecentActivity {
        let history = self.history.lock().expect("history lock poisoned");
        let entries = history.get(account_id).cloned().unwrap_or_default();
        let today_total = entries
            .iter()
            .filter(|t| t.transaction_time.date_naive() == now.date_naive())
            .fold(Money::ZERO, |acc, t| acc.checked_add(t.amount).unwrap_or(acc));
        let window = chrono::Duration::seconds(self.config.fraud_rapid_succession_window_secs as i64);
        let recent_times = entries
            .iter()
            .filter(|t| now.signed_duration_since(t.transaction_time) <= window)
            .map(|t| t.transaction_time)
            .collect();
        RecentActivity {
            validated_today_total: today_total,
            recent_validated_times: recent_times,
        }
    }

    fn record_validated(&self, transaction: &Transaction) {
        let mut history = self.history.lock().expect("history lock poisoned");
        history
            .entry(transaction.account_id.clone())
            .or_default()
            .push(transaction.clone());
    }

    /// Static validation step (1): amount in range, account exists and active.
    fn validate_static(&self, transaction: &Transaction) -> Result<(), SystemError> {
        if transaction.amount.to_cents() < self.config.min_txn_amount_cents
            || transaction.amount.to_cents() > self.config.max_txn_amount_cents
        {
            return Err(SystemError::InvalidTransaction {
                reason: format!(
                    "amount {} outside [{}, {}]",
                    transaction.amount,
                    Money::from_cents(self.config.min_txn_amount_cents),
                    Money::from_cents(self.config.max_txn_amount_cents),
                ),
            });
        }
        let account = self
            .accounts
            .get(&transaction.account_id)
            .ok_or_else(|| SystemError::AccountNotFound {
                account_id: transaction.account_id.clone(),
            })?;
        if !account.is_active() {
            return Err(SystemError::InvalidTransaction {
                reason: format!("account {} is not active", account.id),
            });
        }
        Ok(())
    }

    /// Runs the full validate→screen→post pipeline for one transaction and
    /// persists the outcome (validated, rejected, or requires-review) either way.
    pub fn submit_transaction(&self, mut transaction: Transaction) -> Result<PostOutcome, SystemError> {
        {
            let mut seen = self.seen_ids.lock().expect("seen-ids lock poisoned");
            if !seen.insert(transaction.id.clone()) {
                return Err(SystemError::DuplicateTransaction {
                    transaction_id: transaction.id.clone(),
                });
            }
        }

        let now = self.clock.now();

        if let Err(e) = self.validate_static(&transaction) {
            transaction.status = ValidationStatus::Rejected;
            transaction.processed_time = Some(now);
            self.store.append_transaction(&transaction).ok();
            return Err(e);
        }

        // Step 2: balance feasibility (debits only).
        let account = self
            .accounts
            .get(&transaction.account_id)
            .expect("existence checked in validate_static");
        if transaction.direction == TransactionDirection::Debit {
            let projected = account
                .balance
                .checked_sub(transaction.amount)
                .map_err(|_| SystemError::InvalidTransaction {
                    reason: "amount overflow".to_string(),
                })?;
            if projected.is_negative() && !account.account_type.allows_negative_balance() {
                transaction.status = ValidationStatus::Rejected;
                transaction.processed_time = Some(now);
                self.store.append_transaction(&transaction).ok();
                return Err(SystemError::InsufficientBalance {
                    account_id: account.id.clone(),
                    required: transaction.amount.to_decimal_string(),
                    available: account.balance.to_decimal_string(),
                });
            }
        }

        // Step 3: fraud screen.
        let activity = self.recent_activity(&account.id, now);
        let assessment = screen_transaction(transaction.amount, now, &activity, &self.config);

        // Step 4: decision.
        if assessment.risk_level == RiskLevel::High {
            transaction.status = ValidationStatus::RequiresReview;
            transaction.processed_time = Some(now);
            self.store.append_transaction(&transaction).ok();
            return Err(SystemError::HeldForReview {
                risk_factors: assessment.factors,
            });
        }

        // Step 5: post, inside this account's critical section.
        let lock = self.lock_for(&account.id);
        let _guard = lock.lock().expect("account lock poisoned");

        let current = self
            .accounts
            .get(&account.id)
            .ok_or_else(|| SystemError::AccountNotFound {
                account_id: account.id.clone(),
            })?;
        let new_balance = match transaction.direction {
            TransactionDirection::Credit => current.balance.checked_add(transaction.amount),
            TransactionDirection::Debit => current.balance.checked_sub(transaction.amount),
        }
        .map_err(|_| SystemError::InvalidTransaction {
            reason: "amount overflow".to_string(),
        })?;

        transaction.status = ValidationStatus::Validated;
        transaction.processed_time = Some(now);

        self.store.append_transaction(&transaction)?;
        self.accounts.update_balance(&account.id, new_balance, now)?;
        self.record_validated(&transaction);

        Ok(PostOutcome {
            new_balance,
            processed_time: now,
        })
    }

    /// Two transactions sharing a reference number: a debit on `from_id`, then
    /// a credit on `to_id`. Locks are acquired in ascending account-id order
    /// by virtue of `submit_transaction` locking only the account it posts to
    /// at a time and the two legs never overlapping in this single-threaded call.
    pub fn transfer(
        &self,
        from_id: &str,
        to_id: &str,
        amount: Money,
        description: &str,
        id_factory: impl Fn() -> String,
    ) -> Result<TransferOutcome, SystemError> {
        let now = self.clock.now();
        let reference = id_factory();

        let mut debit = Transaction::new_pending(
            id_factory(),
            from_id,
            TransactionDirection::Debit,
            amount,
            crate::models::transaction::TransactionCategory::Transfer,
            description,
            now,
        );
        debit.reference = Some(reference.clone());

        let debit_outcome = self.submit_transaction(debit.clone());
        if debit_outcome.is_err() {
            return Err(debit_outcome.unwrap_err());
        }

        let mut credit = Transaction::new_pending(
            id_factory(),
            to_id,
            TransactionDirection::Credit,
            amount,
            crate::models::transaction::TransactionCategory::Transfer,
            description,
            now,
        );
        credit.reference = Some(reference.clone());

        match self.submit_transaction(credit.clone()) {
            Ok(_) => Ok(TransferOutcome {
                debit_id: debit.id.clone(),
                credit_id: credit.id.clone(),
            }),
            Err(e) => {
                if self.config.auto_compensate_failed_transfers {
                    let mut reversal = Transaction::new_pending(
                        id_factory(),
                        from_id,
                        TransactionDirection::Credit,
                        amount,
                        crate::models::transaction::TransactionCategory::Transfer,
                        format!("compensating reversal for failed transfer {}", reference),
                        self.clock.now(),
                    );
                    reversal.reference = Some(reference);
                    // Best-effort: if the reversal itself fails there is
                    // nothing further to retry automatically (§9 open question).
                    let _ = self.submit_transaction(reversal);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ledger::store::InMemoryStore;
    use crate::models::account::{AccountStatus, AccountType};
    use crate::models::Account;
    use chrono::TimeZone;

    fn system(now: DateTime<Utc>) -> (Arc<AccountRegistry>, TransactionProcessor) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let accounts = Arc::new(AccountRegistry::bootstrap(store.clone()).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        let processor = TransactionProcessor::new(store, accounts.clone(), clock, Config::default());
        (accounts, processor)
    }

    fn mk_account(id: &str, account_type: AccountType, balance_cents: i64, now: DateTime<Utc>) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            account_type,
            balance: Money::from_cents(balance_cents),
            currency: "USD".to_string(),
            status: AccountStatus::Active,
            created_at: now,
            last_transaction_at: None,
        }
    }

    #[test]
    fn bootstrap_credit_posts_successfully() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("rev", AccountType::PrimaryRevenue, 0, now))
            .unwrap();

        let txn = Transaction::new_pending(
            "t1",
            "rev",
            TransactionDirection::Credit,
            Money::from_major_minor(2500, 0),
            crate::models::transaction::TransactionCategory::Revenue,
            "initial revenue",
            now,
        );
        let outcome = processor.submit_transaction(txn).unwrap();
        assert_eq!(outcome.new_balance.to_cents(), 250_000);
    }

    #[test]
    fn insufficient_balance_is_rejected_and_balance_unchanged() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("res", AccountType::Reserve, 10_000, now))
            .unwrap();

        let txn = Transaction::new_pending(
            "t1",
            "res",
            TransactionDirection::Debit,
            Money::from_major_minor(250, 0),
            crate::models::transaction::TransactionCategory::Transfer,
            "over-debit",
            now,
        );
        let err = processor.submit_transaction(txn).unwrap_err();
        assert!(matches!(err, SystemError::InsufficientBalance { .. }));
        assert_eq!(accounts.get("res").unwrap().balance.to_cents(), 10_000);
    }

    #[test]
    fn operational_expense_may_go_negative() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("opex", AccountType::OperationalExpense, 1000, now))
            .unwrap();

        let txn = Transaction::new_pending(
            "t1",
            "opex",
            TransactionDirection::Debit,
            Money::from_major_minor(50, 0),
            crate::models::transaction::TransactionCategory::OperationalExpense,
            "expense",
            now,
        );
        let outcome = processor.submit_transaction(txn).unwrap();
        assert_eq!(outcome.new_balance.to_cents(), -4000);
    }

    #[test]
    fn large_transaction_at_unusual_time_is_held_for_review() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 3, 0, 0).unwrap(); // Saturday 03:00
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("rev", AccountType::PrimaryRevenue, 0, now))
            .unwrap();

        let txn = Transaction::new_pending(
            "t1",
            "rev",
            TransactionDirection::Debit,
            Money::from_major_minor(11_000, 0),
            crate::models::transaction::TransactionCategory::Transfer,
            "suspicious",
            now,
        );
        let err = processor.submit_transaction(txn).unwrap_err();
        assert!(matches!(err, SystemError::HeldForReview { .. }));
    }

    #[test]
    fn resubmitting_same_id_is_rejected_and_does_not_double_post() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("rev", AccountType::PrimaryRevenue, 0, now))
            .unwrap();

        let txn = Transaction::new_pending(
            "dup-1",
            "rev",
            TransactionDirection::Credit,
            Money::from_major_minor(100, 0),
            crate::models::transaction::TransactionCategory::Revenue,
            "first post",
            now,
        );
        processor.submit_transaction(txn.clone()).unwrap();
        let err = processor.submit_transaction(txn).unwrap_err();
        assert!(matches!(err, SystemError::DuplicateTransaction { .. }));
        assert_eq!(accounts.get("rev").unwrap().balance.to_cents(), 10_000);
    }

    #[test]
    fn transfer_produces_two_validated_legs_sharing_reference() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
        let (accounts, processor) = system(now);
        accounts
            .create(mk_account("rev", AccountType::PrimaryRevenue, 100_000, now))
            .unwrap();
        accounts
            .create(mk_account("res", AccountType::Reserve, 0, now))
            .unwrap();

        let mut counter = 0u32;
        let outcome = processor
            .transfer("rev", "res", Money::from_major_minor(300, 0), "move to reserve", || {
                counter += 1;
                format!("ref-{}", counter)
            })
            .unwrap();
        assert_ne!(outcome.debit_id, outcome.credit_id);
        assert_eq!(accounts.get("rev").unwrap().balance.to_cents(), 70_000);
        assert_eq!(accounts.get("res").unwrap().balance.to_cents(), 30_000);
    }
}
