//! Demonstration plans built on `agentplan-core`

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use agentplan_core::{
    Agent, Config, ExecutionContext, OrchestrationError, Plan, PlanInputs, PlanOutputs, PlanRunner,
};

/// Node ids of the demo pipeline, in execution order
pub const PIPELINE: [&str; 2] = ["processor", "summarizer"];

/// Normalises whitespace and upper-cases the text.
///
/// Fails the first `flaky` calls so retry behavior can be observed.
fn processor(flaky: u32) -> Agent<String, String> {
    let failures = Arc::new(AtomicU32::new(0));
    Agent::from_function("processor", move |text: String| {
        if failures.fetch_add(1, Ordering::SeqCst) < flaky {
            return Err(OrchestrationError::node_execution("processor", "simulated transient failure"));
        }
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase())
    })
}

fn summarizer() -> Agent<String, String> {
    Agent::from_function("summarizer", |text: String| {
        let words = text.split_whitespace().count();
        Ok(format!("{} word(s), {} char(s): {}", words, text.chars().count(), text))
    })
}

/// `processor -> summarizer`, with the configured policies around each agent
pub fn pipeline(config: &Config, flaky: u32) -> agentplan_core::Result<Plan> {
    let fallback = Agent::from_function("processor-fallback", |text: String| Ok(text));
    let processor = processor(flaky).with_policies(config.policies.policy_set(Some(fallback)));
    let summarizer = summarizer().with_policies(config.policies.policy_set(None));

    Plan::builder()
        .node(PIPELINE[0], processor)
        .node(PIPELINE[1], summarizer)
        .edge(PIPELINE[0], PIPELINE[1])
        .build()
}

/// Run the pipeline under `ctx`; cancelling it aborts the run
pub async fn run_pipeline(
    config: &Config,
    ctx: &ExecutionContext,
    input: String,
    flaky: u32,
) -> agentplan_core::Result<PlanOutputs> {
    let plan = pipeline(config, flaky)?;
    PlanRunner::with_config(config.runner.clone())
        .execute_with_context(&plan, PlanInputs::new().with(PIPELINE[0], input), ctx)
        .await
}

/// `a -> b -> a`; always rejected at build time
pub fn cyclic_plan() -> agentplan_core::Result<Plan> {
    let echo = || Agent::from_function("echo", |s: String| Ok(s));
    Plan::builder()
        .node("a", echo())
        .node("b", echo())
        .edge("a", "b")
        .edge("b", "a")
        .build()
}
