//! Explicit per-worker context object
//!
//! Owns every stack and slot one worker thread or task needs. Code that can
//! pass it around should; the ambient accessors in [`crate::context`] operate
//! on an instance attached to the current thread or task.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::command::CommandContext;
use super::execution::{ExecutionContext, ExecutionToken};
use super::job_worker::JobWorkerContext;
use super::stack::ContextStack;
use super::{COMMAND_CONTEXT_STACK, ENGINE_CONFIGURATION_STACK, EXECUTION_CONTEXT_STACK};
use crate::core::errors::{ContextError, Result};
use crate::engine::EngineConfiguration;
use crate::overrides::OverrideSnapshotCache;

#[derive(Debug)]
pub struct EngineContext {
    command_contexts: ContextStack<Arc<CommandContext>>,
    engine_configurations: ContextStack<Arc<EngineConfiguration>>,
    execution_contexts: ContextStack<ExecutionContext>,
    job_worker: Option<JobWorkerContext>,
    override_snapshot: OverrideSnapshotCache,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            command_contexts: ContextStack::new(COMMAND_CONTEXT_STACK),
            engine_configurations: ContextStack::new(ENGINE_CONFIGURATION_STACK),
            execution_contexts: ContextStack::new(EXECUTION_CONTEXT_STACK),
            job_worker: None,
            override_snapshot: OverrideSnapshotCache::new(),
        }
    }

    // Command contexts

    pub fn command_context(&self) -> Option<Arc<CommandContext>> {
        self.command_contexts.current().cloned()
    }

    pub fn push_command_context(&mut self, command: Arc<CommandContext>) {
        debug!(command = %command.command, command_id = %command.id, "entering command");
        self.command_contexts.push(command);
    }

    pub fn pop_command_context(&mut self) -> Result<Arc<CommandContext>> {
        self.command_contexts.pop()
    }

    /// Pop the innermost command and, when it was the outermost one, apply the
    /// snapshot policy of its engine: clear the override snapshot unless
    /// `clear_override_snapshot_on_command_exit` is off.
    pub fn finish_command(&mut self) -> Result<Arc<CommandContext>> {
        let command = self.command_contexts.pop()?;
        if self.command_contexts.is_empty() && !self.override_snapshot.is_empty() {
            let clear = command
                .engine_configuration
                .as_ref()
                .or(self.engine_configurations.current())
                .map(|configuration| configuration.settings().clear_override_snapshot_on_command_exit)
                .unwrap_or(true);
            if clear {
                self.override_snapshot.clear();
            } else {
                debug!(
                    command_id = %command.id,
                    definitions = self.override_snapshot.len(),
                    "override snapshot outlives its command sequence"
                );
            }
        }
        Ok(command)
    }

    pub fn command_depth(&self) -> usize {
        self.command_contexts.depth()
    }

    // Engine configurations

    pub fn engine_configuration(&self) -> Option<Arc<EngineConfiguration>> {
        self.engine_configurations.current().cloned()
    }

    pub fn push_engine_configuration(&mut self, configuration: Arc<EngineConfiguration>) {
        self.engine_configurations.push(configuration);
    }

    pub fn pop_engine_configuration(&mut self) -> Result<Arc<EngineConfiguration>> {
        self.engine_configurations.pop()
    }

    // Execution contexts

    pub fn execution_context(&self) -> Option<ExecutionContext> {
        self.execution_contexts.current().cloned()
    }

    pub fn is_execution_context_active(&self) -> bool {
        !self.execution_contexts.is_empty()
    }

    pub fn push_execution_context(&mut self, execution: Arc<ExecutionToken>) {
        self.execution_contexts.push(ExecutionContext::new(execution));
    }

    pub fn pop_execution_context(&mut self) -> Result<ExecutionContext> {
        self.execution_contexts.pop()
    }

    // Job worker slot

    pub fn job_worker_context(&self) -> Option<&JobWorkerContext> {
        self.job_worker.as_ref()
    }

    pub fn job_worker_context_mut(&mut self) -> Option<&mut JobWorkerContext> {
        self.job_worker.as_mut()
    }

    /// Replace the slot unconditionally, returning the previous value
    pub fn set_job_worker_context(&mut self, worker: JobWorkerContext) -> Option<JobWorkerContext> {
        self.job_worker.replace(worker)
    }

    pub fn remove_job_worker_context(&mut self) -> Option<JobWorkerContext> {
        self.job_worker.take()
    }

    // Override snapshot

    pub fn override_snapshot(&self) -> &OverrideSnapshotCache {
        &self.override_snapshot
    }

    pub fn override_snapshot_mut(&mut self) -> &mut OverrideSnapshotCache {
        &mut self.override_snapshot
    }

    pub fn remove_override_snapshot(&mut self) {
        self.override_snapshot.clear();
    }

    /// Element overrides through the active engine configuration
    pub fn element_properties(
        &mut self,
        element_id: &str,
        process_definition_id: &str,
    ) -> Result<Option<Value>> {
        let configuration = self
            .engine_configuration()
            .ok_or_else(|| ContextError::no_engine_configuration("element_properties"))?;
        self.override_snapshot
            .element_properties(&configuration, element_id, process_definition_id)
    }

    /// Localized overrides through the active engine configuration
    pub fn localized_properties(
        &mut self,
        language: &str,
        element_id: &str,
        process_definition_id: &str,
        use_fallback: bool,
    ) -> Result<Option<Value>> {
        let configuration = self
            .engine_configuration()
            .ok_or_else(|| ContextError::no_engine_configuration("localized_properties"))?;
        self.override_snapshot.localized_properties(
            &configuration,
            language,
            element_id,
            process_definition_id,
            use_fallback,
        )
    }

    /// True when no stack holds an entry. Worker slot and snapshot are not
    /// considered, they legitimately outlive single commands.
    pub fn is_idle(&self) -> bool {
        self.command_contexts.is_empty()
            && self.engine_configurations.is_empty()
            && self.execution_contexts.is_empty()
    }

    /// Drop everything, including the worker slot and snapshot
    pub fn clear(&mut self) {
        self.command_contexts.clear();
        self.engine_configurations.clear();
        self.execution_contexts.clear();
        self.job_worker = None;
        self.override_snapshot.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
