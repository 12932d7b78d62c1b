//! Lock-free run statistics using atomic operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one traversal run. Reset at the start of every run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub requests: AtomicU64,
    pub failures: AtomicU64,
    pub links_found: AtomicU64,
    pub rounds_completed: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issued request (successful or not).
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that failed and was skipped.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record candidate links extracted from one body.
    pub fn record_links(&self, count: u64) {
        self.links_found.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a fully processed round.
    pub fn record_round(&self) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.links_found.store(0, Ordering::Relaxed);
        self.rounds_completed.store(0, Ordering::Relaxed);
    }

    /// Get snapshot for serialization.
    pub fn snapshot(&self) -> RunStatsSnapshot {
        RunStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            links_found: self.links_found.load(Ordering::Relaxed),
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of run stats.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatsSnapshot {
    pub requests: u64,
    pub failures: u64,
    pub links_found: u64,
    pub rounds_completed: u64,
}
