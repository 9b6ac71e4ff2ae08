//! Lifecycle listeners attached to interpreted process scopes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::context::{self, ExecutionContext, ExecutionToken};
use crate::core::errors::{ContextError, Result};

/// Lifecycle events a scope or transition can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    Start,
    End,
    Take,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Start => "start",
            LifecycleEvent::End => "end",
            LifecycleEvent::Take => "take",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LifecycleEvent {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(LifecycleEvent::Start),
            "end" => Ok(LifecycleEvent::End),
            "take" => Ok(LifecycleEvent::Take),
            other => Err(ContextError::configuration(format!(
                "unknown lifecycle event '{other}'"
            ))),
        }
    }
}

/// Callback run synchronously by the interpreter when an event fires
pub trait ExecutionListener: Send + Sync {
    fn name(&self) -> &str {
        "execution-listener"
    }

    fn notify(&self, execution: &ExecutionContext) -> anyhow::Result<()>;
}

/// Registration interface of a graph node
pub trait ListenerRegistration {
    fn add_listener(&mut self, event: LifecycleEvent, listener: Arc<dyn ExecutionListener>);

    /// Listeners for an event, in registration order
    fn listeners(&self, event: LifecycleEvent) -> &[Arc<dyn ExecutionListener>];
}

/// Root scope of an interpreted process graph
#[derive(Default)]
pub struct ProcessScope {
    id: String,
    listeners: HashMap<LifecycleEvent, Vec<Arc<dyn ExecutionListener>>>,
}

impl ProcessScope {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            listeners: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run every listener of `event` with the token's execution context on
    /// the ambient stack. Stops at the first failing listener; the context
    /// is popped either way.
    pub fn fire(&self, event: LifecycleEvent, execution: Arc<ExecutionToken>) -> Result<()> {
        let listeners = self.listeners(event);
        if listeners.is_empty() {
            return Ok(());
        }

        let _guard = context::enter_execution(execution);
        let execution_context = context::execution_context()
            .ok_or_else(|| ContextError::empty_stack(context::EXECUTION_CONTEXT_STACK))?;

        for listener in listeners {
            trace!(scope = %self.id, %event, listener = listener.name(), "notifying listener");
            listener
                .notify(&execution_context)
                .map_err(|e| ContextError::listener(event.name(), e))?;
        }
        Ok(())
    }
}

impl ListenerRegistration for ProcessScope {
    fn add_listener(&mut self, event: LifecycleEvent, listener: Arc<dyn ExecutionListener>) {
        debug!(scope = %self.id, %event, listener = listener.name(), "registering listener");
        self.listeners.entry(event).or_default().push(listener);
    }

    fn listeners(&self, event: LifecycleEvent) -> &[Arc<dyn ExecutionListener>] {
        self.listeners
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Debug for ProcessScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(event, listeners)| (event.name(), listeners.len()))
            .collect();
        f.debug_struct("ProcessScope")
            .field("id", &self.id)
            .field("listeners", &counts)
            .finish()
    }
}
