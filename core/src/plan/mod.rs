//! Plans - validated DAGs of agents
//!
//! ```rust,ignore
//! let plan = Plan::builder()
//!     .node("processor", processor)
//!     .node("summarizer", summarizer)
//!     .edge("processor", "summarizer")
//!     .build()?;
//! ```
//!
//! Each node has at most one upstream producer. Roots (nodes without one)
//! take their input from the initial inputs handed to the runner.

pub mod builder;
pub mod graph;
pub mod node;

pub use builder::PlanBuilder;
pub use graph::{Plan, PlanStats};
pub use node::{value, Edge, Node, TypeTag, Value};
