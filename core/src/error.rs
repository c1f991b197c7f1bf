//! Crate-wide error kinds.
//!
//! Every fallible public operation returns `Result<T, SystemError>` (or a
//! narrower error that converts into it via `#[from]`), matching the design
//! note that exceptions never cross a component boundary as control flow —
//! only typed results do. The stakeholder channel (`events.rs`) is the one
//! place an error kind plus a human message crosses out of the system.

use thiserror::Error;

/// The kinds enumerated in the error-handling design: one flat enum so any
/// component's failure can be reported uniformly on the stakeholder channel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    /// The task queue is at its configured high-water mark.
    #[error("queue is throttled (depth {depth} >= high water {high_water})")]
    Throttled { depth: usize, high_water: usize },

    /// A submitted task failed basic validation.
    #[error("invalid task: {reason}")]
    InvalidTask { reason: String },

    /// A submitted transaction failed static validation.
    #[error("invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    /// A debit would take a non-negative-allowed account below zero.
    #[error("insufficient balance on account {account_id}: required {required}, available {available}")]
    InsufficientBalance {
        account_id: String,
        required: String,
        available: String,
    },

    /// No account exists with the given id.
    #[error("account not found: {account_id}")]
    AccountNotFound { account_id: String },

    /// The fraud screen flagged the transaction for manual review.
    #[error("transaction held for review: {risk_factors:?}")]
    HeldForReview { risk_factors: Vec<String> },

    /// The durable store is unavailable (I/O failure, lock poisoned, etc).
    #[error("store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A store write could not be serialized/deserialized.
    #[error("serialization failure: {reason}")]
    SerializationFailure { reason: String },

    /// A transaction with this id was already posted; rejected rather than
    /// posted a second time (§8 "exactly-once posting").
    #[error("duplicate transaction id: {transaction_id}")]
    DuplicateTransaction { transaction_id: String },

    /// A dispatched assignment was not acknowledged within the configured window.
    #[error("assignment timed out: task {task_id} worker {worker_id}")]
    AssignmentTimeout { task_id: String, worker_id: String },

    /// No registered worker met the compatibility floor for a task.
    ///
    /// Not a hard failure: the task remains queued and a `load-warning` event
    /// is emitted. Kept in this enum so it can still be logged/reported
    /// uniformly wherever callers want to inspect "why didn't this dispatch".
    #[error("no compatible worker for task {task_id}")]
    NoCompatibleWorker { task_id: String },

    /// A task's declared dependencies are not yet complete.
    #[error("dependency not ready for task {task_id}: {dependency_id}")]
    DependencyUnready { task_id: String, dependency_id: String },
}
