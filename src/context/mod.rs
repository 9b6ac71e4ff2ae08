//! Ambient runtime context
//!
//! Every OS thread lazily owns one [`EngineContext`]. A tokio task can run
//! inside [`scope`] to carry its own context instead; while such a scope is
//! active the functions below use the task's context, so a task that migrates
//! between runtime threads keeps seeing its own stacks.
//!
//! Nothing here is shared between threads and nothing takes a lock.
//! Collaborators (definition cache, override service, listeners) are always
//! called with the context released, so they may use this API themselves.

pub mod command;
pub mod engine_context;
pub mod execution;
pub mod job_worker;
pub mod stack;

pub use command::CommandContext;
pub use engine_context::EngineContext;
pub use execution::{ExecutionContext, ExecutionToken};
pub use job_worker::JobWorkerContext;
pub use stack::ContextStack;

use serde_json::Value;
use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::warn;

use crate::core::errors::{ContextError, Result};
use crate::engine::EngineConfiguration;
use crate::overrides::snapshot;

pub const COMMAND_CONTEXT_STACK: &str = "command context";
pub const ENGINE_CONFIGURATION_STACK: &str = "engine configuration";
pub const EXECUTION_CONTEXT_STACK: &str = "execution context";

thread_local! {
    static THREAD_CONTEXT: RefCell<EngineContext> = RefCell::new(EngineContext::new());
}

tokio::task_local! {
    static TASK_CONTEXT: RefCell<EngineContext>;
}

/// Run `f` against the context of the current task, or of the current thread
/// outside any task scope. `f` must not call back into this module.
pub(crate) fn with_current<R>(f: impl FnOnce(&mut EngineContext) -> R) -> R {
    if TASK_CONTEXT.try_with(|_| ()).is_ok() {
        TASK_CONTEXT.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_CONTEXT.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Run a future with its own task-local context
pub async fn scope<F: Future>(context: EngineContext, future: F) -> F::Output {
    TASK_CONTEXT.scope(RefCell::new(context), future).await
}

/// Run a closure with its own context, isolated from the thread's
pub fn scope_sync<R>(context: EngineContext, f: impl FnOnce() -> R) -> R {
    TASK_CONTEXT.sync_scope(RefCell::new(context), f)
}

/// Detach the current context, leaving a fresh one in its place
pub fn take() -> EngineContext {
    with_current(|ctx| std::mem::take(ctx))
}

/// Worker teardown: drop every stack entry, the worker slot and the snapshot
pub fn reset() {
    let previous = take();
    if !previous.is_idle() {
        warn!("resetting context with live stack entries");
    }
}

pub fn is_idle() -> bool {
    with_current(|ctx| ctx.is_idle())
}

// Command contexts

pub fn command_context() -> Option<Arc<CommandContext>> {
    with_current(|ctx| ctx.command_context())
}

pub fn push_command_context(command: Arc<CommandContext>) {
    with_current(|ctx| ctx.push_command_context(command))
}

pub fn pop_command_context() -> Result<Arc<CommandContext>> {
    with_current(|ctx| ctx.pop_command_context())
}

// Engine configurations

pub fn engine_configuration() -> Option<Arc<EngineConfiguration>> {
    with_current(|ctx| ctx.engine_configuration())
}

pub fn push_engine_configuration(configuration: Arc<EngineConfiguration>) {
    with_current(|ctx| ctx.push_engine_configuration(configuration))
}

pub fn pop_engine_configuration() -> Result<Arc<EngineConfiguration>> {
    with_current(|ctx| ctx.pop_engine_configuration())
}

// Execution contexts

pub fn execution_context() -> Option<ExecutionContext> {
    with_current(|ctx| ctx.execution_context())
}

pub fn is_execution_context_active() -> bool {
    with_current(|ctx| ctx.is_execution_context_active())
}

pub fn push_execution_context(execution: Arc<ExecutionToken>) {
    with_current(|ctx| ctx.push_execution_context(execution))
}

pub fn pop_execution_context() -> Result<ExecutionContext> {
    with_current(|ctx| ctx.pop_execution_context())
}

// Job worker slot

pub fn job_worker_context() -> Option<JobWorkerContext> {
    with_current(|ctx| ctx.job_worker_context().cloned())
}

/// Mutate the worker slot in place, `None` when it is empty
pub fn with_job_worker_context<R>(f: impl FnOnce(&mut JobWorkerContext) -> R) -> Option<R> {
    with_current(|ctx| ctx.job_worker_context_mut().map(f))
}

pub fn set_job_worker_context(worker: JobWorkerContext) {
    with_current(|ctx| ctx.set_job_worker_context(worker));
}

pub fn remove_job_worker_context() {
    with_current(|ctx| ctx.remove_job_worker_context());
}

// Dynamic overrides

/// Element property overrides of `element_id`, read from the snapshot of
/// `process_definition_id`
pub fn element_properties(element_id: &str, process_definition_id: &str) -> Result<Option<Value>> {
    let (configuration, info_node) = snapshot_info_node("element_properties", process_definition_id)?;
    Ok(snapshot::lookup_element_properties(
        &configuration,
        element_id,
        &info_node,
    ))
}

/// Localized overrides of `element_id`, optionally walking the locale
/// fallback chain of `language` and then of the engine's default locale
pub fn localized_properties(
    language: &str,
    element_id: &str,
    process_definition_id: &str,
    use_fallback: bool,
) -> Result<Option<Value>> {
    let (configuration, info_node) =
        snapshot_info_node("localized_properties", process_definition_id)?;
    snapshot::lookup_localized_properties(
        &configuration,
        language,
        element_id,
        &info_node,
        use_fallback,
    )
}

/// Localized lookup using the engine's `localization_fallback` setting
pub fn localized_properties_default(
    language: &str,
    element_id: &str,
    process_definition_id: &str,
) -> Result<Option<Value>> {
    let use_fallback = engine_configuration()
        .map(|configuration| configuration.settings().localization_fallback)
        .ok_or_else(|| ContextError::no_engine_configuration("localized_properties"))?;
    localized_properties(language, element_id, process_definition_id, use_fallback)
}

pub fn remove_override_snapshot() {
    with_current(|ctx| ctx.remove_override_snapshot())
}

fn snapshot_info_node(
    operation: &str,
    process_definition_id: &str,
) -> Result<(Arc<EngineConfiguration>, Arc<Value>)> {
    let (configuration, memoized) = with_current(|ctx| {
        (
            ctx.engine_configuration(),
            ctx.override_snapshot().get(process_definition_id),
        )
    });
    let configuration =
        configuration.ok_or_else(|| ContextError::no_engine_configuration(operation))?;
    if let Some(info_node) = memoized {
        return Ok((configuration, info_node));
    }

    let loaded = snapshot::load_info_node(&configuration, process_definition_id)?;
    let info_node = with_current(|ctx| {
        ctx.override_snapshot_mut()
            .insert(process_definition_id, loaded)
    });
    Ok((configuration, info_node))
}

// Scope guards

/// Pops its command context on drop, unwinding included
#[must_use = "the command context is popped when the guard drops"]
pub struct CommandGuard {
    _not_send: PhantomData<*const ()>,
}

/// Pops its engine configuration on drop
#[must_use = "the engine configuration is popped when the guard drops"]
pub struct EngineConfigurationGuard {
    _not_send: PhantomData<*const ()>,
}

/// Pops its execution context on drop
#[must_use = "the execution context is popped when the guard drops"]
pub struct ExecutionGuard {
    _not_send: PhantomData<*const ()>,
}

/// Push a command context until the returned guard drops. Leaving the
/// outermost command also applies the engine's override snapshot policy.
pub fn enter_command(command: Arc<CommandContext>) -> CommandGuard {
    push_command_context(command);
    CommandGuard {
        _not_send: PhantomData,
    }
}

pub fn enter_engine_configuration(configuration: Arc<EngineConfiguration>) -> EngineConfigurationGuard {
    push_engine_configuration(configuration);
    EngineConfigurationGuard {
        _not_send: PhantomData,
    }
}

pub fn enter_execution(execution: Arc<ExecutionToken>) -> ExecutionGuard {
    push_execution_context(execution);
    ExecutionGuard {
        _not_send: PhantomData,
    }
}

impl Drop for CommandGuard {
    fn drop(&mut self) {
        if let Err(e) = with_current(|ctx| ctx.finish_command()) {
            warn!("command guard found no command to pop: {}", e);
        }
    }
}

impl Drop for EngineConfigurationGuard {
    fn drop(&mut self) {
        if let Err(e) = pop_engine_configuration() {
            warn!("engine configuration guard found nothing to pop: {}", e);
        }
    }
}

impl Drop for ExecutionGuard {
    fn drop(&mut self) {
        if let Err(e) = pop_execution_context() {
            warn!("execution guard found nothing to pop: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_pop_on_panic() {
        reset();
        let result = std::panic::catch_unwind(|| {
            let _command = enter_command(Arc::new(CommandContext::new("Failing")));
            let _execution = enter_execution(Arc::new(ExecutionToken::new_process_instance("p:1:1")));
            assert!(command_context().is_some());
            panic!("command failed");
        });

        assert!(result.is_err());
        assert!(command_context().is_none());
        assert!(!is_execution_context_active());
        assert!(is_idle());
    }

    #[test]
    fn test_scope_sync_isolated_from_thread() {
        reset();
        push_command_context(Arc::new(CommandContext::new("Outer")));

        let inner_seen = scope_sync(EngineContext::new(), || {
            let before = command_context().is_none();
            push_command_context(Arc::new(CommandContext::new("Inner")));
            before
        });

        assert!(inner_seen);
        assert_eq!(command_context().unwrap().command, "Outer");
        pop_command_context().unwrap();
        assert!(pop_command_context().is_err());
    }
}
