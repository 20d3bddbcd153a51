//! Execution context
//!
//! Passed to every agent call. Carries cancellation, the trace id of the
//! enclosing run, and the node id once the agent runs inside a plan.

use tokio_util::sync::CancellationToken;

use super::ids::TraceId;

/// Context for a single agent execution
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Trace ID shared by a whole plan run
    pub trace_id: TraceId,

    /// Cancellation token
    ///
    /// Cancelled when the caller loses interest: a timeout fired, a sibling
    /// node failed, or the run itself was cancelled.
    pub cancellation: CancellationToken,

    node_id: Option<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Context driven by an externally owned token
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            trace_id: TraceId::new(),
            cancellation,
            node_id: None,
        }
    }

    /// Create child context with same trace
    ///
    /// Cancelling the parent cancels the child, never the other way around.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            cancellation: self.cancellation.child_token(),
            node_id: self.node_id.clone(),
        }
    }

    /// Child context bound to a plan node
    pub fn for_node(&self, node_id: impl Into<String>) -> Self {
        let mut child = self.child();
        child.node_id = Some(node_id.into());
        child
    }

    /// Node this execution belongs to, if any
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Check if cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Resolves once this context is cancelled
    pub async fn cancelled(&self) {
        self.cancellation.cancelled().await
    }

    /// Request cancellation of this context and all of its children
    pub fn cancel(&self) {
        self.cancellation.cancel()
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}
