//! Fallback policy

use crate::agent::{Agent, ExecutionContext};

/// Run `fallback` with the same input when `primary` fails
///
/// If the fallback fails too, the primary's error is returned: it explains
/// why the fallback was needed. Non-recoverable primary errors skip the
/// fallback entirely.
pub fn with_fallback<I, O>(primary: Agent<I, O>, fallback: Agent<I, O>) -> Agent<I, O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
{
    let name = primary.name().to_string();

    Agent::from_async_with_context(name, move |input: I, ctx: ExecutionContext| {
        let primary = primary.clone();
        let fallback = fallback.clone();
        async move {
            let primary_err = match primary.execute_with_context(&ctx, input.clone()).await {
                Ok(output) => return Ok(output),
                Err(e) if !e.is_recoverable() => return Err(e),
                Err(e) => e,
            };

            tracing::warn!(
                agent = primary.name(),
                fallback = fallback.name(),
                "primary failed, using fallback: {}",
                primary_err
            );

            match fallback.execute_with_context(&ctx, input).await {
                Ok(output) => Ok(output),
                Err(fallback_err) => {
                    tracing::debug!(fallback = fallback.name(), "fallback failed too: {}", fallback_err);
                    Err(primary_err)
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrchestrationError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counted(agent: Agent<u32, u32>, calls: Arc<AtomicU32>) -> Agent<u32, u32> {
        let name = agent.name().to_string();
        Agent::from_async(name, move |x: u32| {
            let agent = agent.clone();
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                agent.execute(x).await
            }
        })
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let fallback_calls = Arc::new(AtomicU32::new(0));
        let primary = Agent::from_function("primary", |x: u32| Ok(x + 1));
        let fallback = counted(Agent::constant("fallback", 0), fallback_calls.clone());

        let agent = with_fallback(primary, fallback);
        assert_eq!(agent.execute(1).await, Ok(2));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_used_on_failure() {
        let primary = Agent::always_fail("primary", "down");
        let fallback = Agent::from_function("fallback", |x: u32| Ok(x * 10));

        let agent = with_fallback(primary, fallback);
        assert_eq!(agent.execute(4).await, Ok(40));
    }

    #[tokio::test]
    async fn test_both_fail_returns_primary_error() {
        let primary: Agent<u32, u32> = Agent::always_fail("primary", "primary reason");
        let fallback = Agent::always_fail("fallback", "fallback reason");

        let agent = with_fallback(primary, fallback);
        assert_eq!(
            agent.execute(0).await,
            Err(OrchestrationError::node_execution("primary", "primary reason"))
        );
    }

    #[tokio::test]
    async fn test_fatal_primary_error_skips_fallback() {
        let fallback_calls = Arc::new(AtomicU32::new(0));
        let primary = Agent::from_function("primary", |_: u32| {
            Err(OrchestrationError::plan_validation("not recoverable"))
        });
        let fallback = counted(Agent::constant("fallback", 7), fallback_calls.clone());

        let agent = with_fallback(primary, fallback);
        assert!(matches!(
            agent.execute(0).await,
            Err(OrchestrationError::PlanValidation { .. })
        ));
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }
}
