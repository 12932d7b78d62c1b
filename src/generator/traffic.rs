//! Round-based randomized traversal.
//!
//! Round 0 of the frontier is the configured root URLs. Each URL is visited
//! after a jittered delay; links extracted from the body seed a bounded
//! random subset of the next round. The run stops when every round has been
//! processed or the deadline fires, whichever comes first.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::extract::{LinkExtractor, RegexExtractor};
use crate::session::{Fetcher, HttpSession, SessionError};
use crate::stats::RunStats;

use super::config::{ConfigError, TrafficConfig};

/// Unrecoverable run failures. Per-request errors are absorbed, not surfaced.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("session setup failed: {0}")]
    Session(#[from] SessionError),
}

/// Drives jittered GET traffic across a growing frontier of URLs.
///
/// The traversal is sequential by design: requests within a run never
/// overlap, so pacing and branch selection stay deterministic relative to
/// the frontier. The deadline timer is the only background activity.
pub struct TrafficGenerator {
    config: TrafficConfig,
    extractor: Box<dyn LinkExtractor>,
    rng: StdRng,
    stats: Arc<RunStats>,
}

impl TrafficGenerator {
    /// Validates `config` and builds a generator seeded from OS entropy.
    pub fn new(config: TrafficConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic variant: jitter, branch counts, and picks follow `rng`.
    pub fn with_rng(config: TrafficConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            extractor: Box::new(RegexExtractor::default()),
            rng,
            stats: Arc::new(RunStats::new()),
        })
    }

    /// Replaces the link-extraction strategy. Call before `start`; has no
    /// effect on a run already in progress.
    pub fn set_extractor(&mut self, extractor: Box<dyn LinkExtractor>) {
        self.extractor = extractor;
    }

    /// Replaces the default URL-matching expression. Call before `start`.
    pub fn set_url_pattern(&mut self, pattern: Regex) {
        self.extractor = Box::new(RegexExtractor::new(pattern));
    }

    /// Counters for the current (or most recent) run.
    pub fn stats(&self) -> Arc<RunStats> {
        Arc::clone(&self.stats)
    }

    /// Runs the traversal until every round is processed or the timeout
    /// expires. Both outcomes are success; the only error is session setup.
    pub async fn start(&mut self) -> Result<(), RunError> {
        self.start_with_token(CancelToken::new()).await
    }

    /// Like `start`, but the caller keeps a handle that can cancel the run
    /// early. The configured timeout is armed on the same token.
    pub async fn start_with_token(&mut self, token: CancelToken) -> Result<(), RunError> {
        let session = HttpSession::new()?;
        token.expire_after(self.config.timeout);
        self.run(&session, &token).await;
        Ok(())
    }

    /// The round loop. Returns the frontier it built, one entry per round.
    async fn run(&mut self, session: &dyn Fetcher, token: &CancelToken) -> Vec<Vec<String>> {
        self.stats.reset();

        let mut frontier: Vec<Vec<String>> = vec![Vec::new(); self.config.max_depth];
        frontier[0] = self.config.root_urls.clone();

        for round in 0..self.config.max_depth {
            info!("round {} ({} urls)", round, frontier[round].len());

            for slot in 0..frontier[round].len() {
                let url = frontier[round][slot].clone();

                if token.is_cancelled() {
                    info!("run expired before visiting {}", url);
                    return frontier;
                }

                let jitter = self.draw_jitter();
                debug!("waiting {:?} before {}", jitter, url);
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("run expired while waiting to visit {}", url);
                        return frontier;
                    }
                    _ = tokio::time::sleep(jitter) => {}
                }

                let body = tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        info!("run expired mid-request to {}", url);
                        return frontier;
                    }
                    result = session.get(&url) => {
                        self.stats.record_request();
                        match result {
                            Ok(body) => body,
                            Err(err) => {
                                warn!("skipping {}: {}", url, err);
                                self.stats.record_failure();
                                continue;
                            }
                        }
                    }
                };

                let candidates = self.extractor.extract(&body);
                self.stats.record_links(candidates.len() as u64);
                if candidates.is_empty() {
                    debug!("no links found at {}", url);
                    continue;
                }

                // The last round has no successor to seed.
                if round + 1 >= self.config.max_depth {
                    continue;
                }

                let branches = self.draw_branch_count(round);
                debug!(
                    "branching {} of {} candidates from {}",
                    branches,
                    candidates.len(),
                    url
                );
                for _ in 0..branches {
                    let pick = self.rng.gen_range(0..candidates.len());
                    frontier[round + 1].push(candidates[pick].clone());
                }
            }

            self.stats.record_round();
        }

        info!("all {} rounds completed", self.config.max_depth);
        frontier
    }

    /// Uniform draw from [min_jitter, max_jitter). A degenerate window is a
    /// fixed delay, not an error.
    fn draw_jitter(&mut self) -> Duration {
        let (min, max) = (self.config.min_jitter_ms, self.config.max_jitter_ms);
        let millis = if min >= max {
            min
        } else {
            self.rng.gen_range(min..max)
        };
        Duration::from_millis(millis)
    }

    /// Branch count in [0, max_width − round). A non-positive bound forces
    /// zero expansion, never an error.
    fn draw_branch_count(&mut self, round: usize) -> usize {
        let bound = self.config.max_width.saturating_sub(round);
        if bound == 0 {
            0
        } else {
            self.rng.gen_range(0..bound)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Serves canned bodies; URLs without one fail like a dead host.
    /// Records every call in order.
    struct ScriptedFetcher {
        bodies: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
        cancel_after_first: Option<CancelToken>,
    }

    impl ScriptedFetcher {
        fn new(bodies: Vec<(&str, &str)>) -> Self {
            Self {
                bodies: bodies
                    .into_iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
                cancel_after_first: None,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn get(&self, url: &str) -> Result<String, SessionError> {
            let call_count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(url.to_string());
                calls.len()
            };
            if call_count == 1 {
                if let Some(token) = &self.cancel_after_first {
                    token.cancel();
                }
            }
            self.bodies.get(url).cloned().ok_or_else(|| {
                SessionError::RequestFailed(url.to_string(), "connection refused".into())
            })
        }
    }

    fn generator(config: TrafficConfig, seed: u64) -> TrafficGenerator {
        init_tracing();
        TrafficGenerator::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    /// Opt-in log output: `RUST_LOG=debug cargo test -- --nocapture`.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn quiet_config(roots: Vec<&str>, depth: usize, width: usize) -> TrafficConfig {
        let mut config = TrafficConfig::new(
            roots.into_iter().map(String::from).collect(),
            depth,
            width,
            Duration::from_secs(3600),
        );
        config.min_jitter_ms = 0;
        config.max_jitter_ms = 0;
        config
    }

    #[tokio::test]
    async fn test_round_zero_is_root_urls_in_order() {
        let roots = vec!["http://a", "http://b", "http://c"];
        let mut gen = generator(quiet_config(roots.clone(), 3, 2), 7);
        let fetcher = ScriptedFetcher::new(vec![]);

        let frontier = gen.run(&fetcher, &CancelToken::new()).await;

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier[0], roots);
    }

    #[tokio::test]
    async fn test_requests_follow_frontier_order() {
        let mut gen = generator(quiet_config(vec!["http://a", "http://b"], 1, 1), 7);
        let fetcher = ScriptedFetcher::new(vec![("http://a", ""), ("http://b", "")]);

        gen.run(&fetcher, &CancelToken::new()).await;

        assert_eq!(fetcher.calls(), vec!["http://a", "http://b"]);
    }

    #[tokio::test]
    async fn test_failed_request_skips_to_next_url_in_round() {
        let mut gen = generator(quiet_config(vec!["http://broken", "http://ok"], 1, 1), 7);
        let fetcher = ScriptedFetcher::new(vec![("http://ok", "plain text")]);

        gen.run(&fetcher, &CancelToken::new()).await;

        assert_eq!(fetcher.calls(), vec!["http://broken", "http://ok"]);
        assert_eq!(gen.stats().failure_count(), 1);
        assert_eq!(gen.stats().request_count(), 2);
    }

    #[tokio::test]
    async fn test_depth_one_issues_one_request_and_no_expansion() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 1, 1), 7);
        let fetcher =
            ScriptedFetcher::new(vec![("http://seed", "see http://next.example.com here")]);

        let frontier = gen.run(&fetcher, &CancelToken::new()).await;

        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(frontier.len(), 1);
    }

    #[tokio::test]
    async fn test_next_round_is_populated_only_from_extracted_candidates() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 2, 10), 42);
        let fetcher = ScriptedFetcher::new(vec![(
            "http://seed",
            "http://a.example and http://b.example",
        )]);

        let frontier = gen.run(&fetcher, &CancelToken::new()).await;

        for url in &frontier[1] {
            assert!(
                url == "http://a.example" || url == "http://b.example",
                "unexpected frontier entry {url}"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_extraction_skips_expansion() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 2, 10), 42);
        let fetcher = ScriptedFetcher::new(vec![("http://seed", "no links in this body")]);

        let frontier = gen.run(&fetcher, &CancelToken::new()).await;

        assert!(frontier[1].is_empty());
    }

    #[tokio::test]
    async fn test_width_minus_round_at_zero_forces_no_expansion() {
        // width 1: the bound is 1 at round 0, so every draw lands on 0.
        let mut gen = generator(quiet_config(vec!["http://seed"], 3, 1), 42);
        let fetcher = ScriptedFetcher::new(vec![("http://seed", "http://linked.example")]);

        let frontier = gen.run(&fetcher, &CancelToken::new()).await;

        assert!(frontier[1].is_empty());
        assert!(frontier[2].is_empty());
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[test]
    fn test_branch_count_stays_within_shrinking_bound() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 5, 4), 99);

        for round in 0..8 {
            let bound = 4usize.saturating_sub(round);
            for _ in 0..100 {
                let count = gen.draw_branch_count(round);
                if bound == 0 {
                    assert_eq!(count, 0);
                } else {
                    assert!(count < bound, "count {count} out of bound {bound} at round {round}");
                }
            }
        }
    }

    #[test]
    fn test_jitter_stays_within_window() {
        let mut config = quiet_config(vec!["http://seed"], 1, 1);
        config.min_jitter_ms = 100;
        config.max_jitter_ms = 200;
        let mut gen = generator(config, 5);

        for _ in 0..100 {
            let jitter = gen.draw_jitter();
            assert!(jitter >= Duration::from_millis(100));
            assert!(jitter < Duration::from_millis(200));
        }
    }

    #[test]
    fn test_degenerate_jitter_window_is_a_fixed_delay() {
        let mut config = quiet_config(vec!["http://seed"], 1, 1);
        config.min_jitter_ms = 250;
        config.max_jitter_ms = 250;
        let mut gen = generator(config, 5);

        assert_eq!(gen.draw_jitter(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_seeded_runs_are_repeatable() {
        let bodies = vec![(
            "http://seed",
            "http://a.example http://b.example http://c.example",
        )];
        let config = quiet_config(vec!["http://seed"], 2, 8);

        let mut first = generator(config.clone(), 1234);
        let frontier_a = first
            .run(&ScriptedFetcher::new(bodies.clone()), &CancelToken::new())
            .await;

        let mut second = generator(config, 1234);
        let frontier_b = second
            .run(&ScriptedFetcher::new(bodies), &CancelToken::new())
            .await;

        assert_eq!(frontier_a, frontier_b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_during_jitter_wait_stops_the_run() {
        let mut config = quiet_config(vec!["http://seed"], 1, 1);
        config.min_jitter_ms = 60_000;
        config.max_jitter_ms = 60_000;
        let mut gen = generator(config, 7);
        let fetcher = ScriptedFetcher::new(vec![("http://seed", "")]);

        let token = CancelToken::new();
        token.expire_after(Duration::from_millis(100));

        gen.run(&fetcher, &token).await;

        assert!(fetcher.calls().is_empty());
        assert_eq!(gen.stats().request_count(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_mid_round_stops_before_the_next_url() {
        let token = CancelToken::new();
        let mut fetcher = ScriptedFetcher::new(vec![("http://a", ""), ("http://b", "")]);
        fetcher.cancel_after_first = Some(token.clone());

        let mut gen = generator(quiet_config(vec!["http://a", "http://b"], 1, 1), 7);
        gen.run(&fetcher, &token).await;

        assert_eq!(fetcher.calls(), vec!["http://a"]);
    }

    #[tokio::test]
    async fn test_start_returns_ok_when_already_cancelled() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 1, 1), 7);
        let token = CancelToken::new();
        token.cancel();

        // Cancellation wins before any request is issued, so the real
        // session is never exercised.
        let result = gen.start_with_token(token).await;

        assert!(result.is_ok());
        assert_eq!(gen.stats().request_count(), 0);
    }

    #[tokio::test]
    async fn test_rounds_completed_counts_full_runs() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 3, 1), 7);
        let fetcher = ScriptedFetcher::new(vec![("http://seed", "")]);

        gen.run(&fetcher, &CancelToken::new()).await;

        assert_eq!(gen.stats().snapshot().rounds_completed, 3);
    }

    #[test]
    fn test_custom_pattern_replaces_the_default_extractor() {
        let mut gen = generator(quiet_config(vec!["http://seed"], 1, 1), 7);
        gen.set_url_pattern(Regex::new(r"ftp://[a-z.]+").unwrap());

        let urls = gen.extractor.extract("ftp://files.example and http://skipped");

        assert_eq!(urls, vec!["ftp://files.example"]);
    }

    #[test]
    fn test_invalid_config_builds_no_generator() {
        let config = TrafficConfig::new(vec![], 1, 1, Duration::from_secs(1));
        assert!(TrafficGenerator::new(config).is_err());
    }
}
