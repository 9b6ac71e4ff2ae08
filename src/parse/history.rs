//! History wiring for parsed process definitions
//!
//! Every parsed process gets the one shared end handler registered on its
//! root scope. The handler writes a history record when an instance ends.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::listeners::{ExecutionListener, LifecycleEvent, ListenerRegistration};
use super::{ElementKind, ParseHandler};
use crate::context::{self, ExecutionContext};
use crate::core::errors::ContextError;

/// Records produced by history listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HistoryRecord {
    ProcessInstanceEnded {
        engine: String,
        process_instance_id: String,
        process_definition_id: String,
        end_activity_id: Option<String>,
        command_id: Option<String>,
        ended_at: DateTime<Utc>,
    },
}

/// Destination for history records
pub trait HistorySink: Send + Sync {
    fn emit(&self, record: &HistoryRecord);
}

/// A sink that only logs
pub struct LoggingHistorySink;

impl HistorySink for LoggingHistorySink {
    fn emit(&self, record: &HistoryRecord) {
        info!("History: {:?}", record);
    }
}

/// A buffering sink that collects records
#[derive(Default)]
pub struct BufferingHistorySink {
    records: RwLock<Vec<HistoryRecord>>,
}

impl BufferingHistorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.read().clone()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl HistorySink for BufferingHistorySink {
    fn emit(&self, record: &HistoryRecord) {
        self.records.write().push(record.clone());
    }
}

/// Writes the "process instance ended" record. Stateless, so one instance
/// serves every process definition.
#[derive(Debug, Default)]
pub struct ProcessInstanceEndHandler;

impl ExecutionListener for ProcessInstanceEndHandler {
    fn name(&self) -> &str {
        "process-instance-end"
    }

    fn notify(&self, execution: &ExecutionContext) -> anyhow::Result<()> {
        let configuration = context::engine_configuration()
            .ok_or_else(|| ContextError::no_engine_configuration("process instance end history"))?;

        let Some(sink) = configuration.history_sink() else {
            debug!(
                process_instance_id = execution.process_instance_id(),
                "history disabled, skipping end record"
            );
            return Ok(());
        };

        sink.emit(&HistoryRecord::ProcessInstanceEnded {
            engine: configuration.name().to_string(),
            process_instance_id: execution.process_instance_id().to_string(),
            process_definition_id: execution.process_definition_id().to_string(),
            end_activity_id: execution.activity_id().map(str::to_string),
            command_id: context::command_context().map(|command| command.id.clone()),
            ended_at: Utc::now(),
        });
        Ok(())
    }
}

lazy_static! {
    static ref PROCESS_INSTANCE_END_HANDLER: Arc<ProcessInstanceEndHandler> =
        Arc::new(ProcessInstanceEndHandler);
}

/// The process-wide end handler instance
pub fn process_instance_end_handler() -> Arc<dyn ExecutionListener> {
    PROCESS_INSTANCE_END_HANDLER.clone()
}

/// Registers the shared end handler on a parsed process's root scope
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessHistoryParseHandler;

impl ParseHandler for ProcessHistoryParseHandler {
    fn handled_type(&self) -> ElementKind {
        ElementKind::Process
    }

    fn parse(&self, root_scope: &mut dyn ListenerRegistration) {
        root_scope.add_listener(LifecycleEvent::End, process_instance_end_handler());
    }
}
