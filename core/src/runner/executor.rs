//! Plan executor - runs a Plan respecting dependencies
//!
//! The executor:
//! 1. Starts every root node with its initial input
//! 2. Runs ready nodes concurrently (up to the concurrency limit)
//! 3. Feeds each completed output to the node's dependents
//! 4. Stops at the first error, cancelling whatever is still running

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use tokio::task::{self, AbortHandle, JoinSet};
use tracing::{debug, info, warn, Instrument};

use super::values::{PlanInputs, PlanOutputs};
use crate::agent::ExecutionContext;
use crate::config::RunnerConfig;
use crate::error::{OrchestrationError, Result};
use crate::plan::{Node, Plan, Value};

/// Executes plans
///
/// Stateless apart from its configuration; one runner may execute many
/// plans concurrently.
#[derive(Debug, Clone, Default)]
pub struct PlanRunner {
    config: RunnerConfig,
}

impl PlanRunner {
    /// Runner with unbounded parallelism
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Runner with at most `max` node tasks in flight
    pub fn with_max_concurrency(max: usize) -> Self {
        Self::with_config(RunnerConfig {
            max_concurrency: Some(max),
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Execute `plan` with a fresh context
    pub async fn execute(&self, plan: &Plan, inputs: PlanInputs) -> Result<PlanOutputs> {
        self.execute_with_context(plan, inputs, &ExecutionContext::new())
            .await
    }

    /// Execute `plan` under a caller-owned context
    ///
    /// Cancelling `ctx` aborts every in-flight node and fails the run.
    pub async fn execute_with_context(
        &self,
        plan: &Plan,
        inputs: PlanInputs,
        ctx: &ExecutionContext,
    ) -> Result<PlanOutputs> {
        let span = tracing::info_span!("plan_run", trace_id = %ctx.trace_id, nodes = plan.len());
        self.run(plan, inputs, ctx.child()).instrument(span).await
    }

    async fn run(&self, plan: &Plan, inputs: PlanInputs, run_ctx: ExecutionContext) -> Result<PlanOutputs> {
        if plan.is_empty() {
            return Ok(PlanOutputs::default());
        }

        let started = Instant::now();
        info!("plan run started");

        // Cancels every node context on any exit path, including drop.
        let _guard = run_ctx.cancellation.clone().drop_guard();

        for key in inputs.keys() {
            if !plan.is_root(key) {
                debug!(node = key, "ignoring initial input for a non-root node");
            }
        }

        let mut ready: VecDeque<(Node, Value)> = VecDeque::new();
        for node in plan.roots() {
            match inputs.get(node.id()) {
                Some(input) => ready.push_back((node.clone(), input.clone())),
                None => {
                    warn!(node = node.id(), "no initial input for root node");
                    return Err(node.failure("missing input"));
                }
            }
        }

        let limit = self.config.max_concurrency.unwrap_or(usize::MAX).max(1);
        let mut tasks: JoinSet<Result<Value>> = JoinSet::new();
        let mut in_flight: HashMap<task::Id, Node> = HashMap::new();
        let mut outputs: HashMap<String, Value> = HashMap::with_capacity(plan.len());

        loop {
            while tasks.len() < limit {
                let Some((node, input)) = ready.pop_front() else {
                    break;
                };
                let handle = spawn_node(&mut tasks, &run_ctx, node.clone(), input);
                in_flight.insert(handle.id(), node);
            }

            let joined = tokio::select! {
                biased;
                _ = run_ctx.cancelled() => {
                    tasks.abort_all();
                    warn!("plan run cancelled");
                    return Err(OrchestrationError::node_execution("", "run cancelled"));
                }
                joined = tasks.join_next_with_id() => joined,
            };

            // Nothing in flight and nothing ready: every node has completed.
            let Some(joined) = joined else {
                break;
            };

            let task_id = match &joined {
                Ok((task_id, _)) => *task_id,
                Err(join_err) => join_err.id(),
            };
            let Some(node) = in_flight.remove(&task_id) else {
                continue;
            };

            match joined {
                Ok((_, Ok(output))) => {
                    for dependent in plan.dependents(node.id()) {
                        if let Some(next) = plan.node(dependent) {
                            ready.push_back((next.clone(), output.clone()));
                        }
                    }
                    outputs.insert(node.id().to_string(), output);
                }
                Ok((_, Err(err))) => {
                    warn!(node = node.id(), in_flight = tasks.len(), "node failed, stopping run: {}", err);
                    run_ctx.cancel();
                    tasks.abort_all();
                    return Err(err);
                }
                Err(join_err) => {
                    warn!(node = node.id(), "node task did not complete: {}", join_err);
                    run_ctx.cancel();
                    tasks.abort_all();
                    let message = if join_err.is_panic() {
                        "node task panicked"
                    } else {
                        "node task aborted"
                    };
                    return Err(node.failure(message));
                }
            }
        }

        info!(
            completed = outputs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "plan run finished"
        );
        Ok(PlanOutputs::from(outputs))
    }
}

fn spawn_node(
    tasks: &mut JoinSet<Result<Value>>,
    run_ctx: &ExecutionContext,
    node: Node,
    input: Value,
) -> AbortHandle {
    let node_ctx = run_ctx.for_node(node.id());
    let span = tracing::debug_span!("node", node_id = node.id(), agent = node.agent_name());

    tasks.spawn(
        async move {
            let started = Instant::now();
            debug!("node started");
            let result = node.run(&node_ctx, input).await;
            if result.is_ok() {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "node completed");
            }
            result
        }
        .instrument(span),
    )
}
