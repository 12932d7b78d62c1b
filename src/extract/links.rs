//! Regex-backed link extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default expression matching `http://` and `https://` URLs.
pub const DEFAULT_URL_PATTERN: &str =
    r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*(),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+";

static DEFAULT_URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_URL_PATTERN).expect("default URL pattern compiles")
});

/// Strategy for pulling candidate URLs out of a response body.
///
/// Implementations must be pure: identical input yields identical output,
/// in order of appearance, duplicates preserved.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Vec<String>;
}

/// Extractor backed by a regular expression.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    pattern: Regex,
}

impl RegexExtractor {
    /// Extractor with a custom URL-matching expression.
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl Default for RegexExtractor {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_URL_REGEX.clone(),
        }
    }
}

impl LinkExtractor for RegexExtractor {
    /// Returns all non-overlapping matches in order of appearance.
    fn extract(&self, body: &str) -> Vec<String> {
        self.pattern
            .find_iter(body)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
