//! Domain model types shared by the ledger and dispatch subsystems.

pub mod account;
pub mod assignment;
pub mod compatibility;
pub mod priority;
pub mod report;
pub mod task;
pub mod transaction;
pub mod worker;

pub use account::{Account, AccountStatus, AccountType};
pub use assignment::Assignment;
pub use compatibility::Compatibility;
pub use priority::{PriorityScore, RecomputeTrigger};
pub use report::Report;
pub use task::{Task, TaskComplexity, TaskRequirements, TaskStatus};
pub use transaction::{Transaction, TransactionCategory, TransactionDirection, ValidationStatus};
pub use worker::{ExperienceEntry, PerformanceMetrics, WorkerProfile};
