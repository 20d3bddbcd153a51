//! Retry policy
//!
//! Re-runs an agent on recoverable failures, waiting a backoff delay between
//! attempts. Non-recoverable errors are returned on the first attempt.

use std::time::Duration;
use tokio::time::sleep;

use crate::agent::{Agent, ExecutionContext};

/// Delay between two attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed(Duration),
    /// `base * factor^(n-1)` before retry `n`, capped at `max`
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
    },
}

impl Backoff {
    pub fn none() -> Self {
        Backoff::Fixed(Duration::ZERO)
    }

    /// Delay to wait after `failed_attempts` failures (1-based)
    pub fn delay_for_attempt(&self, failed_attempts: u32) -> Duration {
        if failed_attempts == 0 {
            return Duration::ZERO;
        }
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, factor, max } => {
                let scale = factor.powi((failed_attempts - 1).min(i32::MAX as u32) as i32);
                if !scale.is_finite() {
                    return max;
                }
                if scale <= 0.0 {
                    return Duration::ZERO;
                }
                // mul_f64 panics on overflow, so cap before scaling.
                if base.as_secs_f64() * scale >= max.as_secs_f64() {
                    return max;
                }
                base.mul_f64(scale).min(max)
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed(Duration::from_millis(100))
    }
}

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first try included. Never below 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// `max_attempts` tries with a flat delay in between
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    pub fn no_retry() -> Self {
        Self::new(1, Backoff::none())
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Backoff::default())
    }
}

/// Wrap `agent` so recoverable failures are retried under `policy`
///
/// Returns the first success, the first non-recoverable error, or the last
/// error once `policy.max_attempts` attempts have failed.
pub fn with_retry<I, O>(agent: Agent<I, O>, policy: RetryPolicy) -> Agent<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    let name = agent.name().to_string();
    let max_attempts = policy.max_attempts.max(1);

    Agent::from_async_with_context(name, move |input: I, ctx: ExecutionContext| {
        let inner = agent.clone();
        async move {
            let mut attempt = 1;
            loop {
                let err = match inner.execute_with_context(&ctx, input.clone()).await {
                    Ok(output) => return Ok(output),
                    Err(e) => e,
                };

                if !err.is_recoverable() {
                    return Err(err);
                }
                if attempt >= max_attempts || ctx.is_cancelled() {
                    tracing::warn!(
                        agent = inner.name(),
                        attempts = attempt,
                        "retries exhausted: {}",
                        err
                    );
                    return Err(err);
                }

                let delay = policy.backoff.delay_for_attempt(attempt);
                tracing::debug!(
                    agent = inner.name(),
                    attempt,
                    ?delay,
                    "attempt failed, retrying: {}",
                    err
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    })
}
