//! Traffic run configuration and validation.

use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors. All fatal: no generator is built from an invalid
/// config.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one root URL is required")]
    NoRootUrls,

    #[error("invalid root URL {url:?}: {source}")]
    InvalidRootUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("maxDepth must be at least 1")]
    InvalidDepth,

    #[error("maxWidth must be at least 1")]
    InvalidWidth,

    #[error("timeout must be a positive duration")]
    InvalidTimeout,

    #[error("minJitterMs ({min}) must not exceed maxJitterMs ({max})")]
    InvalidJitter { min: u64, max: u64 },
}

/// Traffic run configuration. Immutable once a generator accepts it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficConfig {
    /// Seed URLs making up round 0 of the frontier.
    pub root_urls: Vec<String>,
    /// Number of rounds to run.
    pub max_depth: usize,
    /// Per-URL branch cap; the effective cap shrinks by one each round.
    pub max_width: usize,
    /// Wall-clock budget for the whole run.
    pub timeout: Duration,
    /// Lower bound of the pre-request jitter in milliseconds.
    #[serde(default)]
    pub min_jitter_ms: u64,
    /// Upper bound (exclusive) of the pre-request jitter in milliseconds.
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,
}

/// Default jitter window upper bound: 10 seconds.
fn default_max_jitter_ms() -> u64 {
    10_000
}

impl TrafficConfig {
    /// Configuration with the default [0, 10)s jitter window.
    pub fn new(
        root_urls: Vec<String>,
        max_depth: usize,
        max_width: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            root_urls,
            max_depth,
            max_width,
            timeout,
            min_jitter_ms: 0,
            max_jitter_ms: default_max_jitter_ms(),
        }
    }

    /// Fails fast on the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_urls.is_empty() {
            return Err(ConfigError::NoRootUrls);
        }
        for url in &self.root_urls {
            Url::parse(url).map_err(|source| ConfigError::InvalidRootUrl {
                url: url.clone(),
                source,
            })?;
        }
        if self.max_depth < 1 {
            return Err(ConfigError::InvalidDepth);
        }
        if self.max_width < 1 {
            return Err(ConfigError::InvalidWidth);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.min_jitter_ms > self.max_jitter_ms {
            return Err(ConfigError::InvalidJitter {
                min: self.min_jitter_ms,
                max: self.max_jitter_ms,
            });
        }
        Ok(())
    }
}
