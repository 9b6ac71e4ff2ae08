//! Execution tokens and the context value wrapping them
//!
//! A token is a position inside an instantiated process graph. The
//! interpreter pushes an [`ExecutionContext`] for the token while listeners
//! and interpretation steps run, so they can find it without it being passed
//! down every call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A position within an instantiated process graph plus its local data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionToken {
    pub id: String,
    pub process_instance_id: String,
    pub process_definition_id: String,
    /// Activity the token currently sits on, `None` before start and after end
    pub activity_id: Option<String>,
    pub variables: Map<String, Value>,
}

impl ExecutionToken {
    /// Root token of a new process instance. Its id doubles as the instance id.
    pub fn new_process_instance(process_definition_id: impl Into<String>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        Self {
            process_instance_id: id.clone(),
            id,
            process_definition_id: process_definition_id.into(),
            activity_id: None,
            variables: Map::new(),
        }
    }

    /// Child token inside the same process instance
    pub fn child(&self) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            process_instance_id: self.process_instance_id.clone(),
            process_definition_id: self.process_definition_id.clone(),
            activity_id: self.activity_id.clone(),
            variables: Map::new(),
        }
    }

    pub fn at_activity(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_id = Some(activity_id.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn is_process_instance(&self) -> bool {
        self.id == self.process_instance_id
    }
}

/// Wraps the execution token for as long as a listener or step needs it
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    execution: Arc<ExecutionToken>,
}

impl ExecutionContext {
    pub fn new(execution: Arc<ExecutionToken>) -> Self {
        Self { execution }
    }

    pub fn execution(&self) -> &Arc<ExecutionToken> {
        &self.execution
    }

    pub fn process_instance_id(&self) -> &str {
        &self.execution.process_instance_id
    }

    pub fn process_definition_id(&self) -> &str {
        &self.execution.process_definition_id
    }

    pub fn activity_id(&self) -> Option<&str> {
        self.execution.activity_id.as_deref()
    }
}

impl From<ExecutionToken> for ExecutionContext {
    fn from(token: ExecutionToken) -> Self {
        Self::new(Arc::new(token))
    }
}
