//! Configuration management
//!
//! TOML file with two sections:
//!
//! ```toml
//! [runner]
//! max_concurrency = 8
//!
//! [policies]
//! timeout_ms = 2000
//!
//! [policies.retry]
//! max_attempts = 3
//! backoff_ms = 100
//! ```

pub mod store;
pub mod types;

pub use store::Config;
pub use types::{PolicyConfig, RetryConfig, RunnerConfig};
