//! Process-wide service state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Readiness flag and start time shared by every request task.
///
/// `ready` is written once by the warmup task and only read afterwards. The
/// transition is one-way: there is no API to mark the service not ready.
#[derive(Debug)]
pub struct ServiceState {
    ready: AtomicBool,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
}

impl ServiceState {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    /// Whether warmup has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Mark warmup as complete. Returns `true` only for the call that flipped the flag.
    pub fn mark_ready(&self) -> bool {
        self.ready
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.uptime().as_secs_f64()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at_utc
    }
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}
