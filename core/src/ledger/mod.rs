//! The Transactional Ledger Core.

pub mod account_registry;
pub mod fraud_screen;
pub mod processor;
pub mod reporting;
pub mod store;

pub use account_registry::AccountRegistry;
pub use fraud_screen::{screen_transaction, FraudAssessment, RiskLevel};
pub use processor::{PostOutcome, TransactionProcessor};
pub use reporting::generate_period_report;
pub use store::{InMemoryStore, JsonFileStore, Store};
