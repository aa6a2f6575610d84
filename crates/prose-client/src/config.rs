//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration for local development.

use std::time::Duration;

use prose_remote::BackendConfig;
use prose_shared::constants::{
    DEFAULT_AUTH_DELAY_MS, DEFAULT_COMMENT_DELAY_MS, DEFAULT_EVENT_CAPACITY,
    DEFAULT_LIKE_DELAY_MS, DEFAULT_PUBLISH_DELAY_MS,
};

use crate::optimistic::ReconcilePolicy;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Simulated latency of sign-in / sign-up.
    /// Env: `PROSE_AUTH_DELAY_MS`
    pub auth_delay: Duration,

    /// Simulated latency of publishing a post.
    /// Env: `PROSE_PUBLISH_DELAY_MS`
    pub publish_delay: Duration,

    /// Simulated latency of submitting a comment.
    /// Env: `PROSE_COMMENT_DELAY_MS`
    pub comment_delay: Duration,

    /// Simulated latency of confirming a like.
    /// Env: `PROSE_LIKE_DELAY_MS`
    pub like_delay: Duration,

    /// Probability that a simulated remote call fails.
    /// Env: `PROSE_FAILURE_RATE` (0.0 to 1.0)
    /// Default: `0.0`
    pub failure_rate: f64,

    /// Whether an unknown email may sign in (an account is created).
    /// Env: `PROSE_ALLOW_UNKNOWN_SIGN_IN` (true/false)
    /// Default: `true`
    pub allow_unknown_sign_in: bool,

    /// What to do with an optimistic change whose confirmation fails.
    /// Env: `PROSE_RECONCILE` (`rollback` / `fire-and-forget`)
    /// Default: `rollback`
    pub reconcile: ReconcilePolicy,

    /// Whether to load the fixture users, posts, and comments at startup.
    /// Env: `PROSE_SEED_FIXTURES` (true/false)
    /// Default: `true`
    pub seed_fixtures: bool,

    /// Capacity of the client event channel.
    /// Env: `PROSE_EVENT_CAPACITY`
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_delay: Duration::from_millis(DEFAULT_AUTH_DELAY_MS),
            publish_delay: Duration::from_millis(DEFAULT_PUBLISH_DELAY_MS),
            comment_delay: Duration::from_millis(DEFAULT_COMMENT_DELAY_MS),
            like_delay: Duration::from_millis(DEFAULT_LIKE_DELAY_MS),
            failure_rate: 0.0,
            allow_unknown_sign_in: true,
            reconcile: ReconcilePolicy::Rollback,
            seed_fixtures: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(delay) = parse_millis(&lookup, "PROSE_AUTH_DELAY_MS") {
            config.auth_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "PROSE_PUBLISH_DELAY_MS") {
            config.publish_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "PROSE_COMMENT_DELAY_MS") {
            config.comment_delay = delay;
        }
        if let Some(delay) = parse_millis(&lookup, "PROSE_LIKE_DELAY_MS") {
            config.like_delay = delay;
        }

        if let Some(val) = lookup("PROSE_FAILURE_RATE") {
            match val.trim().parse::<f64>() {
                Ok(rate) if (0.0..=1.0).contains(&rate) => config.failure_rate = rate,
                _ => {
                    tracing::warn!(value = %val, "Invalid PROSE_FAILURE_RATE, using default");
                }
            }
        }

        if let Some(allow) = parse_flag(&lookup, "PROSE_ALLOW_UNKNOWN_SIGN_IN") {
            config.allow_unknown_sign_in = allow;
        }

        if let Some(val) = lookup("PROSE_RECONCILE") {
            match val.parse::<ReconcilePolicy>() {
                Ok(policy) => config.reconcile = policy,
                Err(e) => {
                    tracing::warn!(value = %val, error = %e, "Invalid PROSE_RECONCILE, using default");
                }
            }
        }

        if let Some(seed) = parse_flag(&lookup, "PROSE_SEED_FIXTURES") {
            config.seed_fixtures = seed;
        }

        if let Some(val) = lookup("PROSE_EVENT_CAPACITY") {
            match val.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.event_capacity = n,
                _ => {
                    tracing::warn!(value = %val, "Invalid PROSE_EVENT_CAPACITY, using default");
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Zero-latency configuration with no fixtures, for tests and demos.
    pub fn instant() -> Self {
        Self {
            auth_delay: Duration::ZERO,
            publish_delay: Duration::ZERO,
            comment_delay: Duration::ZERO,
            like_delay: Duration::ZERO,
            seed_fixtures: false,
            ..Self::default()
        }
    }

    /// Settings for the simulated backend.
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            auth_delay: self.auth_delay,
            publish_delay: self.publish_delay,
            comment_delay: self.comment_delay,
            like_delay: self.like_delay,
            failure_rate: self.failure_rate,
            allow_unknown_sign_in: self.allow_unknown_sign_in,
        }
    }
}

fn parse_millis(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<Duration> {
    let val = lookup(key)?;
    match val.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(key, value = %val, "Invalid delay, using default");
            None
        }
    }
}

/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off` in any case.
fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let val = lookup(key)?;
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(key, value = %val, "Invalid flag, using default");
            None
        }
    }
}
