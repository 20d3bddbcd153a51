//! Nodes, edges and type-erased values
//!
//! A node fixes its agent's input and output types when it is created. The
//! plan builder compares those types across every edge, so the runner can
//! move values between nodes as `Value` without further checks.

use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;

use crate::agent::{Agent, ExecutionContext};
use crate::error::{OrchestrationError, Result};

/// A type-erased value flowing between nodes
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wrap a concrete value for the runner
pub fn value<T: Any + Send + Sync>(v: T) -> Value {
    Arc::new(v)
}

/// Runtime type identity with a readable name
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Object-safe view of an `Agent<I, O>`
#[async_trait]
trait ErasedAgent: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, ctx: &ExecutionContext, input: Value) -> Result<Value>;
}

struct TypedAgent<I, O>(Agent<I, O>);

#[async_trait]
impl<I, O> ErasedAgent for TypedAgent<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn run(&self, ctx: &ExecutionContext, input: Value) -> Result<Value> {
        let typed = match input.as_ref().downcast_ref::<I>() {
            Some(v) => v.clone(),
            None => {
                return Err(OrchestrationError::node_execution(
                    self.0.name(),
                    format!("input type mismatch: expected {}", std::any::type_name::<I>()),
                ))
            }
        };
        let output = self.0.execute_with_context(ctx, typed).await?;
        Ok(Arc::new(output) as Value)
    }
}

/// An agent placed into a plan under a unique id
#[derive(Clone)]
pub struct Node {
    id: String,
    agent: Arc<dyn ErasedAgent>,
    input: TypeTag,
    output: TypeTag,
}

impl Node {
    pub fn new<I, O>(id: impl Into<String>, agent: Agent<I, O>) -> Self
    where
        I: Clone + Send + Sync + 'static,
        O: Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            agent: Arc::new(TypedAgent(agent)),
            input: TypeTag::of::<I>(),
            output: TypeTag::of::<O>(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    pub fn input_type(&self) -> TypeTag {
        self.input
    }

    pub fn output_type(&self) -> TypeTag {
        self.output
    }

    /// Run this node's agent; errors carry this node's id
    pub(crate) async fn run(&self, ctx: &ExecutionContext, input: Value) -> Result<Value> {
        self.agent
            .run(ctx, input)
            .await
            .map_err(|e| e.with_node_id(&self.id))
    }

    /// Failure raised on behalf of this node without running its agent
    pub(crate) fn failure(&self, message: impl Into<String>) -> OrchestrationError {
        OrchestrationError::NodeExecution {
            node_id: self.id.clone(),
            agent_name: self.agent_name().to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("agent", &self.agent_name())
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

/// Directed dependency: `to` consumes the output of `from`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    id: String,
    from: String,
    to: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, from: &Node, to: &Node) -> Self {
        Self::between(id, from.id(), to.id())
    }

    /// Edge between two node ids
    pub fn between(id: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }
}
