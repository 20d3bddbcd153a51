//! Policy composition
//!
//! Layering, innermost first: timeout, retry, fallback.
//!
//! ```text
//! fallback( retry( timeout( agent ) ) )
//! ```
//!
//! Every attempt gets its own time budget, retries run out before the
//! fallback is tried, and the fallback runs once without retry or timeout.

use std::time::Duration;

use super::{with_fallback, with_retry, with_timeout, RetryPolicy};
use crate::agent::Agent;

/// Optional retry, timeout and fallback for one agent
pub struct PolicySet<I, O> {
    pub retry: Option<RetryPolicy>,
    pub timeout: Option<Duration>,
    pub fallback: Option<Agent<I, O>>,
}

impl<I, O> PolicySet<I, O> {
    pub fn new() -> Self {
        Self {
            retry: None,
            timeout: None,
            fallback: None,
        }
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn fallback(mut self, agent: Agent<I, O>) -> Self {
        self.fallback = Some(agent);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.retry.is_none() && self.timeout.is_none() && self.fallback.is_none()
    }
}

impl<I, O> Default for PolicySet<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O> Clone for PolicySet<I, O> {
    fn clone(&self) -> Self {
        Self {
            retry: self.retry,
            timeout: self.timeout,
            fallback: self.fallback.clone(),
        }
    }
}

impl<I, O> std::fmt::Debug for PolicySet<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicySet")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("fallback", &self.fallback.as_ref().map(|a| a.name().to_string()))
            .finish()
    }
}

/// Apply every policy present in `policies` to `agent`
///
/// Absent policies are skipped. An empty set returns `agent` itself.
pub fn with_policies<I, O>(agent: Agent<I, O>, policies: PolicySet<I, O>) -> Agent<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    let mut agent = agent;
    if let Some(duration) = policies.timeout {
        agent = with_timeout(agent, duration);
    }
    if let Some(policy) = policies.retry {
        agent = with_retry(agent, policy);
    }
    if let Some(fallback) = policies.fallback {
        agent = with_fallback(agent, fallback);
    }
    agent
}
