//! Link extraction module
//!
//! Pulls candidate URLs out of response bodies. Extraction is a capability
//! trait so HTML-aware strategies can replace the default regex one.

mod links;

pub use links::{LinkExtractor, RegexExtractor, DEFAULT_URL_PATTERN};
