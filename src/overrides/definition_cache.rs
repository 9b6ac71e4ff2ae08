//! Shared definition info cache
//!
//! Holds the override document ("info node") of every deployed process
//! definition. Shared across workers, so implementations must be safe for
//! concurrent reads.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Cached definition info for one process definition
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionInfoCacheObject {
    pub process_definition_id: String,
    pub info_node: Arc<Value>,
}

impl DefinitionInfoCacheObject {
    pub fn new(process_definition_id: impl Into<String>, info_node: Value) -> Self {
        Self {
            process_definition_id: process_definition_id.into(),
            info_node: Arc::new(info_node),
        }
    }
}

/// Read contract of the shared definition cache
pub trait DefinitionInfoCache: Send + Sync {
    /// Info for a deployed definition. `None` for a deployed definition is a
    /// data-integrity fault; callers treat it as fatal.
    fn get(&self, process_definition_id: &str) -> Option<DefinitionInfoCacheObject>;
}

/// In-memory definition cache, counting fetches per definition
#[derive(Debug, Default)]
pub struct InMemoryDefinitionInfoCache {
    entries: DashMap<String, DefinitionInfoCacheObject>,
    fetches: DashMap<String, AtomicU64>,
}

impl InMemoryDefinitionInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the info document of a definition
    pub fn insert(&self, process_definition_id: impl Into<String>, info_node: Value) {
        let id = process_definition_id.into();
        debug!(process_definition_id = %id, "caching definition info");
        self.entries
            .insert(id.clone(), DefinitionInfoCacheObject::new(id, info_node));
    }

    pub fn remove(&self, process_definition_id: &str) {
        self.entries.remove(process_definition_id);
    }

    /// Number of `get` calls seen for a definition, hits and misses alike
    pub fn fetch_count(&self, process_definition_id: &str) -> u64 {
        self.fetches
            .get(process_definition_id)
            .map(|count| count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> u64 {
        self.fetches
            .iter()
            .map(|entry| entry.value().load(Ordering::Relaxed))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DefinitionInfoCache for InMemoryDefinitionInfoCache {
    fn get(&self, process_definition_id: &str) -> Option<DefinitionInfoCacheObject> {
        self.fetches
            .entry(process_definition_id.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
        self.entries
            .get(process_definition_id)
            .map(|entry| entry.value().clone())
    }
}
