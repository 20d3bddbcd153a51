//! Structured error types for agentplan
//!
//! A closed taxonomy of orchestration failures. Every fault that crosses an
//! agent, policy or runner boundary is one of these kinds.

use std::time::Duration;
use thiserror::Error;

/// Result alias used across the orchestration core
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Primary error type for agentplan operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// A node's agent faulted or returned a domain failure
    ///
    /// `node_id` is blank when the failure was raised by a bare agent that
    /// has not been placed into a node yet; the caller fills it in.
    #[error("node '{node_id}' (agent '{agent_name}') failed: {message}")]
    NodeExecution {
        node_id: String,
        agent_name: String,
        message: String,
    },

    /// The plan is structurally invalid (never retried)
    #[error("invalid plan: {message}")]
    PlanValidation { message: String },

    /// An execution exceeded its time budget
    #[error("node '{node_id}' timed out after {duration:?}")]
    AgentTimeout { node_id: String, duration: Duration },
}

impl OrchestrationError {
    /// Node execution failure with a blank node id
    pub fn node_execution(agent_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NodeExecution {
            node_id: String::new(),
            agent_name: agent_name.into(),
            message: message.into(),
        }
    }

    pub fn plan_validation(message: impl Into<String>) -> Self {
        Self::PlanValidation {
            message: message.into(),
        }
    }

    pub fn timeout(node_id: impl Into<String>, duration: Duration) -> Self {
        Self::AgentTimeout {
            node_id: node_id.into(),
            duration,
        }
    }

    /// Whether retry and fallback policies may act on this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NodeExecution { .. } | Self::AgentTimeout { .. } => true,
            Self::PlanValidation { .. } => false,
        }
    }

    /// Node id carried by the error, if the kind has one
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Self::NodeExecution { node_id, .. } | Self::AgentTimeout { node_id, .. } => {
                Some(node_id.as_str())
            }
            Self::PlanValidation { .. } => None,
        }
    }

    /// Fill in a blank node id. An id that is already set is kept.
    pub fn with_node_id(mut self, id: &str) -> Self {
        match &mut self {
            Self::NodeExecution { node_id, .. } | Self::AgentTimeout { node_id, .. } => {
                if node_id.is_empty() {
                    *node_id = id.to_string();
                }
            }
            Self::PlanValidation { .. } => {}
        }
        self
    }

    /// Get a user-friendly message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            Self::NodeExecution {
                node_id, message, ..
            } if node_id.is_empty() => format!("Agent failed: {}", message),
            Self::NodeExecution {
                node_id, message, ..
            } => format!("Step '{}' failed: {}", node_id, message),
            Self::PlanValidation { message } => format!("The plan is invalid: {}", message),
            Self::AgentTimeout { node_id, duration } => {
                format!("Step '{}' took longer than {:?}.", node_id, duration)
            }
        }
    }
}
