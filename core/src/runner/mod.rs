//! Plan execution
//!
//! [`PlanRunner`] is a pure scheduler: it never retries or falls back on its
//! own. Resilience belongs to the policies wrapped around individual agents
//! before they are placed into nodes.

pub mod executor;
pub mod values;

pub use executor::PlanRunner;
pub use values::{PlanInputs, PlanOutputs};
