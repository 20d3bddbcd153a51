//! Agent - a named, asynchronous, fallible unit of work
//!
//! An `Agent<I, O>` turns an `I` into a `Result<O>`. Agents are immutable
//! and cheap to clone; the same agent may run concurrently with different
//! inputs. Every invocation runs behind a panic boundary, so a fault in user
//! code always surfaces as `OrchestrationError::NodeExecution`.
//!
//! # Cancellation
//!
//! Dropping the future returned by [`Agent::execute`] cancels the execution
//! at its next suspension point. Agents built with
//! [`Agent::from_async_with_context`] additionally receive the
//! [`ExecutionContext`] and should watch `ctx.cancelled()` for any work they
//! detach from the returned future (spawned tasks). Agents built from plain
//! synchronous closures cannot be interrupted mid-call: cancellation only
//! discards interest in their result.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use super::context::ExecutionContext;
use super::ids::AgentId;
use crate::error::{OrchestrationError, Result};

type AgentFn<I, O> = dyn Fn(I, ExecutionContext) -> BoxFuture<'static, Result<O>> + Send + Sync;

/// A named asynchronous transformation `I -> Result<O>`
pub struct Agent<I, O> {
    id: AgentId,
    name: Arc<str>,
    run: Arc<AgentFn<I, O>>,
}

impl<I, O> Clone for Agent<I, O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            run: self.run.clone(),
        }
    }
}

impl<I, O> std::fmt::Debug for Agent<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

impl<I, O> Agent<I, O> {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same agent behavior under a new identity and name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: AgentId::generate(),
            name: Arc::from(name.into()),
            run: self.run.clone(),
        }
    }
}

impl<I, O> Agent<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Agent from an async function that observes its execution context
    pub fn from_async_with_context<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(I, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        Self {
            id: AgentId::generate(),
            name: Arc::from(name.into()),
            run: Arc::new(move |input, ctx| f(input, ctx).boxed()),
        }
    }

    /// Agent from an async function
    pub fn from_async<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        Self::from_async_with_context(name, move |input, _ctx| f(input))
    }

    /// Agent from a total function returning a `Result`
    pub fn from_function<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(I) -> Result<O> + Send + Sync + 'static,
    {
        Self::from_async_with_context(name, move |input, _ctx| future::ready(f(input)))
    }

    /// Agent from a function that may panic
    ///
    /// A panic is captured and reported as `NodeExecution`.
    pub fn from_unsafe_function<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        Self::from_async_with_context(name, move |input, _ctx| future::ready(Ok(f(input))))
    }

    /// Agent from a function with its own error type
    ///
    /// Errors are rendered with `Display` into a `NodeExecution` message.
    pub fn from_fallible<F, E>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(I) -> std::result::Result<O, E> + Send + Sync + 'static,
        E: Display,
    {
        let name = name.into();
        let agent_name = name.clone();
        Self::from_async_with_context(name, move |input, _ctx| {
            future::ready(
                f(input).map_err(|e| OrchestrationError::node_execution(&agent_name, e.to_string())),
            )
        })
    }

    /// Agent that ignores its input and always yields `value`
    pub fn constant(name: impl Into<String>, value: O) -> Self
    where
        O: Clone + Sync,
    {
        Self::from_async_with_context(name, move |_input, _ctx| future::ready(Ok(value.clone())))
    }

    /// Agent that ignores its input and always fails with `message`
    pub fn always_fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let err = OrchestrationError::node_execution(&name, message);
        Self::from_async_with_context(name, move |_input, _ctx| future::ready(Err(err.clone())))
    }

    /// Execute with a fresh context
    pub async fn execute(&self, input: I) -> Result<O> {
        self.execute_with_context(&ExecutionContext::new(), input).await
    }

    /// Execute under a caller-supplied context
    pub async fn execute_with_context(&self, ctx: &ExecutionContext, input: I) -> Result<O> {
        // The closure itself may panic before it hands back a future.
        let started = std::panic::catch_unwind(AssertUnwindSafe(|| (self.run)(input, ctx.clone())));
        let fut = match started {
            Ok(fut) => fut,
            Err(payload) => return Err(self.fault(payload)),
        };

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(self.fault(payload)),
        }
    }

    fn fault(&self, payload: Box<dyn Any + Send>) -> OrchestrationError {
        let message = panic_message(&*payload);
        tracing::warn!(agent = %self.name, "agent panicked: {}", message);
        OrchestrationError::node_execution(self.name(), format!("panicked: {}", message))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
