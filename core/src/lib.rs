//! agentplan-core - compose asynchronous agents into validated plans
//!
//! ```text
//! Agent ──policies──▶ Agent ──▶ Node ──┐
//!                                      ├──▶ Plan ──▶ PlanRunner ──▶ outputs
//!                               Edge ──┘
//! ```

#![forbid(unsafe_code)]

pub mod agent;
pub mod config;
pub mod error;
pub mod plan;
pub mod policy;
pub mod runner;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use agent::{Agent, ExecutionContext};
pub use config::Config;
pub use error::{OrchestrationError, Result};
pub use plan::{Edge, Node, Plan, PlanBuilder};
pub use policy::{with_fallback, with_policies, with_retry, with_timeout, Backoff, PolicySet, RetryPolicy};
pub use runner::{PlanInputs, PlanOutputs, PlanRunner};
