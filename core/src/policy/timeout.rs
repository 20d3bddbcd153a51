//! Timeout policy

use std::time::Duration;

use crate::agent::{Agent, ExecutionContext};
use crate::error::OrchestrationError;

/// Race each execution of `agent` against a `duration` timer
///
/// When the timer wins, the in-flight execution is dropped, its context is
/// cancelled, and `AgentTimeout` is returned. The node id comes from the
/// execution context and is blank for a bare agent.
pub fn with_timeout<I, O>(agent: Agent<I, O>, duration: Duration) -> Agent<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    let name = agent.name().to_string();

    Agent::from_async_with_context(name, move |input: I, ctx: ExecutionContext| {
        let inner = agent.clone();
        async move {
            let attempt = ctx.child();
            match tokio::time::timeout(duration, inner.execute_with_context(&attempt, input)).await {
                Ok(result) => result,
                Err(_) => {
                    attempt.cancel();
                    let node_id = ctx.node_id().unwrap_or_default();
                    tracing::warn!(agent = inner.name(), node = node_id, ?duration, "execution timed out");
                    Err(OrchestrationError::timeout(node_id, duration))
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    fn sleeper(delay: Duration) -> Agent<&'static str, &'static str> {
        Agent::from_async("sleeper", move |s: &'static str| async move {
            tokio::time::sleep(delay).await;
            Ok(s)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_agent_passes_through() {
        let agent = with_timeout(sleeper(Duration::from_millis(10)), Duration::from_secs(1));
        assert_eq!(agent.execute("done").await, Ok("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_passes_through_unchanged() {
        let failing: Agent<(), ()> = Agent::always_fail("bad", "broken");
        let agent = with_timeout(failing, Duration::from_secs(1));
        assert_eq!(
            agent.execute(()).await,
            Err(OrchestrationError::node_execution("bad", "broken"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_agent_times_out() {
        let agent = with_timeout(sleeper(Duration::from_secs(5)), Duration::from_millis(100));
        assert_eq!(
            agent.execute("late").await,
            Err(OrchestrationError::timeout("", Duration::from_millis(100)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_node_from_context() {
        let agent = with_timeout(sleeper(Duration::from_secs(5)), Duration::from_millis(100));
        let ctx = ExecutionContext::new().for_node("fetch");

        let err = agent.execute_with_context(&ctx, "late").await.unwrap_err();
        assert_eq!(err.node_id(), Some("fetch"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_side_effects_after_timeout() {
        let effects = Arc::new(AtomicU32::new(0));
        let counter = effects.clone();
        let slow: Agent<(), ()> = Agent::from_async("slow-effect", move |_| {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let agent = with_timeout(slow, Duration::from_millis(50));
        assert!(agent.execute(()).await.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(effects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_work_observes_cancellation() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let detached: Agent<(), ()> =
            Agent::from_async_with_context("detached", move |_, ctx: ExecutionContext| {
                let flag = flag.clone();
                async move {
                    let worker = tokio::spawn(async move {
                        ctx.cancelled().await;
                        flag.store(true, Ordering::SeqCst);
                    });
                    let _ = worker.await;
                    Ok(())
                }
            });

        let agent = with_timeout(detached, Duration::from_millis(20));
        assert!(agent.execute(()).await.is_err());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cancelled.load(Ordering::SeqCst));
    }
}
