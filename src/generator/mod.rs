//! Traffic generation module
//!
//! Owns the frontier table and drives rounds of jittered GET requests,
//! expanding the frontier from links found in each response.

mod config;
mod traffic;

pub use config::{ConfigError, TrafficConfig};
pub use traffic::{RunError, TrafficGenerator};
