//! Process Context - runtime context and override caching for a process engine.
//!
//! Commands, job workers and the graph interpreter reach the active command,
//! engine configuration and execution token through per-worker LIFO stacks
//! instead of threading them through every call. On top of that sits a
//! per-command snapshot of dynamic override documents with locale fallback,
//! and the parse-time hook that attaches history listeners to process graphs.

// Core infrastructure modules
pub mod core {
    pub mod config;
    pub mod errors;
    pub mod logging;
}

pub mod context;
pub mod engine;
pub mod locale;
pub mod overrides;
pub mod parse;

// Re-exports for convenience
pub use context::{
    CommandContext, ContextStack, EngineContext, ExecutionContext, ExecutionToken,
    JobWorkerContext,
};
pub use crate::core::config::{EngineSettings, EngineSettingsBuilder};
pub use crate::core::errors::{ContextError, Result};
pub use engine::{EngineConfiguration, EngineConfigurationBuilder};
pub use locale::{candidate_locales, combine, Locale};
pub use overrides::{
    DefinitionInfoCache, DefinitionInfoCacheObject, DynamicOverrideService,
    InMemoryDefinitionInfoCache, JsonOverrideService, OverrideSnapshotCache,
};
pub use parse::{
    ElementKind, ExecutionListener, LifecycleEvent, ListenerRegistration, ParseHandler,
    ProcessHistoryParseHandler, ProcessScope,
};
