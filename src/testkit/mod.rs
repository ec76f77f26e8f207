//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::config::MonitorConfig;
use crate::connection::Reopen;

/// A [`Reopen`] target that records every request it receives.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    reopen_count: AtomicU32,
    reopened_at: Mutex<Vec<Instant>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reopen_count(&self) -> u32 {
        self.reopen_count.load(Ordering::SeqCst)
    }

    /// Instants at which reopens were requested, oldest first.
    pub fn reopened_at(&self) -> Vec<Instant> {
        self.reopened_at.lock().clone()
    }
}

impl Reopen for RecordingConnection {
    fn reopen(&self) {
        self.reopen_count.fetch_add(1, Ordering::SeqCst);
        self.reopened_at.lock().push(Instant::now());
    }
}

/// Reconnecting config matching the canonical scenario: 3 attempts, checks
/// every 5s (at most 30s).
pub fn monitor_config() -> MonitorConfig {
    MonitorConfig::reconnecting(3, 5, 30)
}
