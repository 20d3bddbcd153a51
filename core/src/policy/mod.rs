//! Resilience policies
//!
//! Each policy maps an `Agent<I, O>` to a new `Agent<I, O>` with the same
//! input and output types:
//!
//! - [`with_retry`]: re-run on recoverable errors with a backoff delay
//! - [`with_timeout`]: bound every execution by a duration
//! - [`with_fallback`]: try a second agent when the first one fails
//! - [`with_policies`]: all of the above in a fixed order

pub mod compose;
pub mod fallback;
pub mod retry;
pub mod timeout;

pub use compose::{with_policies, PolicySet};
pub use fallback::with_fallback;
pub use retry::{with_retry, Backoff, RetryPolicy};
pub use timeout::with_timeout;

use std::time::Duration;

use crate::agent::Agent;

/// Method-style access to the policies
impl<I, O> Agent<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    pub fn retrying(self, policy: RetryPolicy) -> Self {
        with_retry(self, policy)
    }

    pub fn timing_out(self, duration: Duration) -> Self {
        with_timeout(self, duration)
    }

    pub fn or_else(self, fallback: Agent<I, O>) -> Self {
        with_fallback(self, fallback)
    }

    pub fn with_policies(self, policies: PolicySet<I, O>) -> Self {
        with_policies(self, policies)
    }
}
