//! meander
//!
//! Simulates synthetic browsing traffic against a set of seed websites, for
//! load-testing or security-testing HTTP origins without a real browser.
//! GET requests are issued in discrete rounds: links extracted from each
//! response body seed a bounded random subset of the next round, with
//! jittered pacing between requests and a hard deadline on the whole run.
//!
//! ```no_run
//! use std::time::Duration;
//! use meander::{TrafficConfig, TrafficGenerator};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TrafficConfig::new(
//!     vec!["https://example.com".into()],
//!     4,                          // rounds
//!     3,                          // per-URL branch cap
//!     Duration::from_secs(120),   // run deadline
//! );
//!
//! let mut generator = TrafficGenerator::new(config)?;
//! generator.start().await?;
//! # Ok(())
//! # }
//! ```
//!
//! A run either completes every round or stops early on the deadline; both
//! are success outcomes. Per-request failures are logged and skipped so a
//! single unreachable origin cannot abort the whole simulated session.

pub mod cancel;
pub mod extract;
pub mod generator;
pub mod session;
pub mod stats;

pub use cancel::CancelToken;
pub use extract::{LinkExtractor, RegexExtractor, DEFAULT_URL_PATTERN};
pub use generator::{ConfigError, RunError, TrafficConfig, TrafficGenerator};
pub use session::{Fetcher, HttpSession, SessionError};
pub use stats::{RunStats, RunStatsSnapshot};
