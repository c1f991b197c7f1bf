//! Durable Store.
//!
//! The spec describes this component through an abstract `exec`/`query`
//! interface with no named storage engine. Rather than fabricate a SQL or
//! embedded-database dependency none of the reference stack actually uses,
//! this follows the teacher's own `orchestrator/checkpoint.rs` pattern: a
//! serde_json snapshot of each table, checksummed with sha256, written
//! atomically (temp file + rename) under one writer lock. `InMemoryStore`
//! gives tests and short-lived `System`s a zero-I/O implementation of the
//! same trait.
//!
//! Schema: three tables — accounts, transactions, reports — matching §3/§6.
//! Indices on (transactions.account), (transactions.date), (transactions.category),
//! (reports.date) are maintained in memory by `AccountRegistry`/`reporting.rs`;
//! the store itself persists full rows and reconstructs indices on load.

use crate::error::SystemError;
use crate::models::{Account, Report, Transaction};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Serialized read/write of accounts, transactions, and reports, single-writer.
///
/// Every method call that mutates state is atomic with respect to other
/// calls on the same store: either the whole write lands or none of it does.
pub trait Store: Send + Sync {
    fn upsert_account(&self, account: &Account) -> Result<(), SystemError>;
    fn append_transaction(&self, transaction: &Transaction) -> Result<(), SystemError>;
    fn append_report(&self, report: &Report) -> Result<(), SystemError>;

    fn load_accounts(&self) -> Result<Vec<Account>, SystemError>;
    fn load_transactions(&self) -> Result<Vec<Transaction>, SystemError>;
    fn load_reports(&self) -> Result<Vec<Report>, SystemError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    accounts: HashMap<String, Account>,
    transactions: Vec<Transaction>,
    reports: Vec<Report>,
}

/// Computes a sha256 checksum over the snapshot's canonical JSON encoding, the
/// same integrity-check idiom as the teacher's checkpoint writer.
fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// JSON-file-backed store. One snapshot file plus a `.sha256` sidecar.
pub struct JsonFileStore {
    path: PathBuf,
    inner: Mutex<Snapshot>,
}

impl JsonFileStore {
    /// Open (or create) the store at `path`, loading any existing snapshot.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SystemError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| SystemError::StoreUnavailable {
                reason: e.to_string(),
            })?;
            Self::verify_checksum(&path, &bytes)?;
            serde_json::from_slice(&bytes).map_err(|e| SystemError::SerializationFailure {
                reason: e.to_string(),
            })?
        } else {
            Snapshot::default()
        };
        Ok(JsonFileStore {
            path,
            inner: Mutex::new(snapshot),
        })
    }

    fn checksum_path(path: &Path) -> PathBuf {
        let mut p = path.to_path_buf();
        let ext = match p.extension() {
            Some(e) => format!("{}.sha256", e.to_string_lossy()),
            None => "sha256".to_string(),
        };
        p.set_extension(ext);
        p
    }

    fn verify_checksum(path: &Path, bytes: &[u8]) -> Result<(), SystemError> {
        let checksum_path = Self::checksum_path(path);
        if !checksum_path.exists() {
            return Ok(());
        }
        let expected = fs::read_to_string(&checksum_path).map_err(|e| SystemError::StoreUnavailable {
            reason: e.to_string(),
        })?;
        let actual = checksum(bytes);
        if expected.trim() != actual {
            return Err(SystemError::StoreUnavailable {
                reason: "snapshot checksum mismatch".to_string(),
            });
        }
        Ok(())
    }

    /// Serialize the snapshot and write it atomically: write to a temp file in
    /// the same directory, then rename over the target so a reader never
    /// observes a partial write.
    fn flush(&self, snapshot: &Snapshot) -> Result<(), SystemError> {
        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|e| SystemError::SerializationFailure {
            reason: e.to_string(),
        })?;
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp_path).map_err(|e| SystemError::StoreUnavailable {
                reason: e.to_string(),
            })?;
            f.write_all(&bytes).map_err(|e| SystemError::StoreUnavailable {
                reason: e.to_string(),
            })?;
        }
        fs::rename(&tmp_path, &self.path).map_err(|e| SystemError::StoreUnavailable {
            reason: e.to_string(),
        })?;
        fs::write(Self::checksum_path(&self.path), checksum(&bytes)).map_err(|e| {
            SystemError::StoreUnavailable {
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn upsert_account(&self, account: &Account) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.accounts.insert(account.id.clone(), account.clone());
        self.flush(&guard)
    }

    fn append_transaction(&self, transaction: &Transaction) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.transactions.push(transaction.clone());
        self.flush(&guard)
    }

    fn append_report(&self, report: &Report) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.reports.push(report.clone());
        self.flush(&guard)
    }

    fn load_accounts(&self) -> Result<Vec<Account>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.accounts.values().cloned().collect())
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.transactions.clone())
    }

    fn load_reports(&self) -> Result<Vec<Report>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.reports.clone())
    }
}

/// Zero-I/O store for tests and ephemeral `System`s that don't set `store_path`.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Snapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

impl Store for InMemoryStore {
    fn upsert_account(&self, account: &Account) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    fn append_transaction(&self, transaction: &Transaction) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.transactions.push(transaction.clone());
        Ok(())
    }

    fn append_report(&self, report: &Report) -> Result<(), SystemError> {
        let mut guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        guard.reports.push(report.clone());
        Ok(())
    }

    fn load_accounts(&self) -> Result<Vec<Account>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.accounts.values().cloned().collect())
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.transactions.clone())
    }

    fn load_reports(&self) -> Result<Vec<Report>, SystemError> {
        let guard = self.inner.lock().map_err(|_| SystemError::StoreUnavailable {
            reason: "store lock poisoned".to_string(),
        })?;
        Ok(guard.reports.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::{AccountStatus, AccountType};
    use crate::money::Money;
    use chrono::Utc;

    fn sample_account() -> Account {
        Account {
            id: "acct-1".to_string(),
            name: "Primary Revenue".to_string(),
            account_type: AccountType::PrimaryRevenue,
            balance: Money::ZERO,
            currency: "USD".to_string(),
            status: AccountStatus::Active,
            created_at: Utc::now(),
            last_transaction_at: None,
        }
    }

    #[test]
    fn in_memory_store_round_trips_accounts() {
        let store = InMemoryStore::new();
        store.upsert_account(&sample_account()).unwrap();
        let loaded = store.load_accounts().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "acct-1");
    }

    #[test]
    fn json_file_store_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("agency-ops-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("snapshot.json");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store.upsert_account(&sample_account()).unwrap();
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        let loaded = reopened.load_accounts().unwrap();
        assert_eq!(loaded.len(), 1);
        fs::remove_dir_all(&dir).ok();
    }
}
