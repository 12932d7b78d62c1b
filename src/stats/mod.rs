//! Statistics module
//!
//! Lock-free counters for a single traversal run.

mod atomic;

pub use atomic::{RunStats, RunStatsSnapshot};
