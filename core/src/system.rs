//! Composition root.
//!
//! Per §9 ("Replace global mutable singletons"): one struct owns every shared
//! component, constructed once and passed by reference. No process-wide
//! statics anywhere in this crate.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::task_registry::TaskRegistry;
use crate::dispatch::worker_registry::WorkerRegistry;
use crate::error::SystemError;
use crate::events::{stakeholder_channel, StakeholderEvent};
use crate::ledger::account_registry::AccountRegistry;
use crate::ledger::processor::TransactionProcessor;
use crate::ledger::store::{InMemoryStore, JsonFileStore, Store};
use crate::models::account::{Account, AccountType};
use crate::money::Money;
use chrono::Utc;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use tracing::info;

/// The ids of the two accounts every bootstrap guarantees exist (§3).
pub const PRIMARY_REVENUE_ACCOUNT_ID: &str = "primary-revenue";
pub const OPERATIONAL_EXPENSE_ACCOUNT_ID: &str = "operational-expense";

/// Owns {Store, Accounts, Processor, Queue (via Dispatcher), Dispatcher, WorkerRegistry}.
pub struct System {
    pub store: Arc<dyn Store>,
    pub accounts: Arc<AccountRegistry>,
    pub processor: Arc<TransactionProcessor>,
    pub workers: Arc<WorkerRegistry>,
    pub tasks: Arc<TaskRegistry>,
    pub dispatcher: Arc<Dispatcher>,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub assignment_notices: Receiver<crate::dispatch::dispatcher::AssignmentNotice>,
    pub stakeholder_events: Receiver<StakeholderEvent>,
    stakeholder_sender: Sender<StakeholderEvent>,
}

impl System {
    /// Build a fresh system. Opens a `JsonFileStore` at `config.store_path` if
    /// set, otherwise an `InMemoryStore`; bootstraps the two guaranteed
    /// accounts named in §3 if they don't already exist in the store.
    pub fn bootstrap(config: Config) -> Result<Self, SystemError> {
        Self::bootstrap_with_clock(config, Arc::new(SystemClock))
    }

    pub fn bootstrap_with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self, SystemError> {
        let store: Arc<dyn Store> = match &config.store_path {
            Some(path) => Arc::new(JsonFileStore::open(path)?),
            None => Arc::new(InMemoryStore::new()),
        };

        let accounts = Arc::new(AccountRegistry::bootstrap(store.clone())?);
        let now = clock.now();

        if accounts.get(PRIMARY_REVENUE_ACCOUNT_ID).is_none() {
            accounts.create(Account::new(
                PRIMARY_REVENUE_ACCOUNT_ID,
                "Primary Revenue",
                AccountType::PrimaryRevenue,
                Money::ZERO,
                config.default_currency.clone(),
                now,
            ))?;
        }
        if accounts.get(OPERATIONAL_EXPENSE_ACCOUNT_ID).is_none() {
            accounts.create(Account::new(
                OPERATIONAL_EXPENSE_ACCOUNT_ID,
                "Operational Expense",
                AccountType::OperationalExpense,
                Money::ZERO,
                config.default_currency.clone(),
                now,
            ))?;
        }

        let processor = Arc::new(TransactionProcessor::new(
            store.clone(),
            accounts.clone(),
            clock.clone(),
            config.clone(),
        ));
        let workers = Arc::new(WorkerRegistry::new());
        let tasks = Arc::new(TaskRegistry::new());

        let (notice_tx, notice_rx) = crossbeam_channel::unbounded();
        let (stakeholder_tx, stakeholder_rx) = stakeholder_channel();

        let dispatcher = Arc::new(Dispatcher::new(
            workers.clone(),
            tasks.clone(),
            processor.clone(),
            clock.clone(),
            config.clone(),
            PRIMARY_REVENUE_ACCOUNT_ID,
            OPERATIONAL_EXPENSE_ACCOUNT_ID,
            notice_tx,
            stakeholder_tx.clone(),
        ));

        info!("system bootstrapped");

        Ok(System {
            store,
            accounts,
            processor,
            workers,
            tasks,
            dispatcher,
            config,
            clock,
            assignment_notices: notice_rx,
            stakeholder_events: stakeholder_rx,
            stakeholder_sender: stakeholder_tx,
        })
    }

    /// A cloneable handle to the stakeholder event sender, for components
    /// constructed outside of `bootstrap` that still need to publish events.
    pub fn stakeholder_sender(&self) -> Sender<StakeholderEvent> {
        self.stakeholder_sender.clone()
    }

    pub fn now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_both_guaranteed_accounts() {
        let system = System::bootstrap(Config::default()).unwrap();
        assert!(system.accounts.get(PRIMARY_REVENUE_ACCOUNT_ID).is_some());
        assert!(system.accounts.get(OPERATIONAL_EXPENSE_ACCOUNT_ID).is_some());
    }

    #[test]
    fn bootstrap_is_idempotent_on_reopen() {
        let config = Config::default();
        let system = System::bootstrap(config.clone()).unwrap();
        let initial = system.accounts.all().len();
        drop(system);
        let reopened = System::bootstrap(config).unwrap();
        assert_eq!(reopened.accounts.all().len(), initial);
    }
}
