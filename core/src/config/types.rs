//! Configuration sections

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::agent::Agent;
use crate::policy::{Backoff, PolicySet, RetryPolicy};

/// Plan runner configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Maximum node tasks in flight at once (unbounded when absent)
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl RunnerConfig {
    pub fn merge(&mut self, other: Self) {
        self.max_concurrency = other.max_concurrency.or(self.max_concurrency);
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, first try included
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    pub backoff_ms: u64,
    /// Growth factor per retry; flat delay when absent
    #[serde(default)]
    pub backoff_multiplier: Option<f64>,
    /// Upper bound for a grown delay
    #[serde(default)]
    pub max_backoff_ms: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 100,
            backoff_multiplier: None,
            max_backoff_ms: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        let base = Duration::from_millis(self.backoff_ms);
        let backoff = match self.backoff_multiplier {
            Some(factor) => Backoff::Exponential {
                base,
                factor,
                max: Duration::from_millis(self.max_backoff_ms.unwrap_or(10_000)),
            },
            None => Backoff::Fixed(base),
        };
        RetryPolicy::new(self.max_attempts, backoff)
    }
}

/// Default policies applied to agents built from configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Per-attempt time budget in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PolicyConfig {
    pub fn merge(&mut self, other: Self) {
        self.retry = other.retry.or(self.retry.take());
        self.timeout_ms = other.timeout_ms.or(self.timeout_ms);
    }

    pub fn retry_policy(&self) -> Option<RetryPolicy> {
        self.retry.as_ref().map(RetryConfig::to_policy)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Policy set with the configured retry and timeout, plus `fallback`
    pub fn policy_set<I, O>(&self, fallback: Option<Agent<I, O>>) -> PolicySet<I, O> {
        PolicySet {
            retry: self.retry_policy(),
            timeout: self.timeout(),
            fallback,
        }
    }
}
