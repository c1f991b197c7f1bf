//! Time source abstraction.
//!
//! Every component that reasons about deadlines, heartbeats, or "how long has
//! this been waiting" goes through a `Clock` rather than calling
//! `Utc::now()` directly, so tests can pin time and assert on it. This plays
//! the same role the teacher's `TimeManager` played for its tick-based
//! simulation: an injectable, swappable time source. Here time is wall-clock,
//! not ticks, because deadlines and heartbeats in this system are real
//! durations (hours, seconds), not simulation steps.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually. Used by tests
/// that need deterministic control over "how much time has passed".
#[derive(Debug, Clone)]
pub struct FixedClock {
    inner: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// Start the clock at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(at)),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut guard = self.inner.lock().expect("fixed clock lock poisoned");
        *guard += duration;
    }

    /// Set the clock to an explicit instant.
    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.inner.lock().expect("fixed clock lock poisoned");
        *guard = at;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.inner.lock().expect("fixed clock lock poisoned")
    }
}
