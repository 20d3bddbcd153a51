//! Agents - named asynchronous units of work
//!
//! ```rust,ignore
//! use agentplan_core::agent::Agent;
//!
//! let upper = Agent::from_function("upper", |s: String| Ok(s.to_uppercase()));
//! assert_eq!(upper.execute("hi".into()).await?, "HI");
//! ```
//!
//! Resilience is added by wrapping agents with the policies in
//! [`crate::policy`]; the wrapped agent is a new value and the original is
//! left untouched.

pub mod context;
pub mod core;
pub mod ids;

pub use self::core::Agent;
pub use context::ExecutionContext;
pub use ids::{AgentId, TraceId};
