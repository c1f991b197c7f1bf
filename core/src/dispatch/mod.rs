//! The Task Distribution Core.

pub mod capability;
pub mod dispatcher;
pub mod priority_engine;
pub mod queue;
pub mod task_registry;
pub mod worker_contract;
pub mod worker_registry;

pub use capability::score_compatibility;
pub use dispatcher::Dispatcher;
pub use priority_engine::{score_priority, SystemContext};
pub use queue::PriorityQueue;
pub use task_registry::TaskRegistry;
pub use worker_contract::{ProcessResult, ValidationOutcome, WorkerExecutor};
pub use worker_registry::WorkerRegistry;
