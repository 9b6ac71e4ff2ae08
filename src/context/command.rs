use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::EngineConfiguration;

/// Bookkeeping for one in-flight command.
///
/// Created by the command executor before the command runs and dropped after
/// it finishes. The context layer only stores it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub id: String,
    pub command: String,
    pub started_at: DateTime<Utc>,
    /// Engine the command was submitted to
    pub engine_configuration: Option<Arc<EngineConfiguration>>,
    pub attributes: HashMap<String, Value>,
}

impl CommandContext {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            id: cuid2::create_id(),
            command: command.into(),
            started_at: Utc::now(),
            engine_configuration: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_engine_configuration(mut self, configuration: Arc<EngineConfiguration>) -> Self {
        self.engine_configuration = Some(configuration);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
