//! Run inputs and outputs keyed by node id

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::plan::Value;

/// Initial inputs for the root nodes of a plan
#[derive(Clone, Default)]
pub struct PlanInputs {
    values: HashMap<String, Value>,
}

impl PlanInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input for `node_id`
    pub fn with<T: Any + Send + Sync>(mut self, node_id: impl Into<String>, value: T) -> Self {
        self.insert(node_id, value);
        self
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, node_id: impl Into<String>, value: T) {
        self.values.insert(node_id.into(), Arc::new(value));
    }

    pub fn get(&self, node_id: &str) -> Option<&Value> {
        self.values.get(node_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, Value>> for PlanInputs {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl std::fmt::Debug for PlanInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Outputs of a successful run, one per node of the plan
#[derive(Clone, Default)]
pub struct PlanOutputs {
    values: HashMap<String, Value>,
}

impl PlanOutputs {
    /// Typed access to a node's output
    ///
    /// `None` if the node is unknown or produced a different type.
    pub fn get<T: Any>(&self, node_id: &str) -> Option<&T> {
        self.values.get(node_id)?.as_ref().downcast_ref::<T>()
    }

    pub fn get_value(&self, node_id: &str) -> Option<&Value> {
        self.values.get(node_id)
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.values.contains_key(node_id)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Value> {
        self.values
    }
}

impl From<HashMap<String, Value>> for PlanOutputs {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl std::fmt::Debug for PlanOutputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
