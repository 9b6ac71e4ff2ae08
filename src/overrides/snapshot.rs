//! Per-command snapshot of dynamic override documents
//!
//! Within one command every query against a definition's overrides must see
//! the same document, so the info node is fetched from the shared definition
//! cache at most once per definition and then reused until the snapshot is
//! removed.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::core::errors::{ContextError, Result};
use crate::engine::EngineConfiguration;
use crate::locale;

/// Memoized info nodes keyed by process definition id
#[derive(Debug, Clone, Default)]
pub struct OverrideSnapshotCache {
    snapshots: HashMap<String, Arc<Value>>,
}

impl OverrideSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, process_definition_id: &str) -> Option<Arc<Value>> {
        self.snapshots.get(process_definition_id).cloned()
    }

    /// Keep the first document stored for a definition; later inserts for the
    /// same id return the memoized one.
    pub fn insert(&mut self, process_definition_id: &str, info_node: Arc<Value>) -> Arc<Value> {
        self.snapshots
            .entry(process_definition_id.to_string())
            .or_insert(info_node)
            .clone()
    }

    pub fn contains(&self, process_definition_id: &str) -> bool {
        self.snapshots.contains_key(process_definition_id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Drop every memoized document. No-op when already empty.
    pub fn clear(&mut self) {
        if !self.snapshots.is_empty() {
            debug!(definitions = self.snapshots.len(), "removing override snapshot");
            self.snapshots.clear();
        }
    }

    /// Memoized info node, loading it from the shared cache on first use
    pub fn info_node(
        &mut self,
        configuration: &EngineConfiguration,
        process_definition_id: &str,
    ) -> Result<Arc<Value>> {
        if let Some(info_node) = self.get(process_definition_id) {
            trace!(process_definition_id, "override snapshot hit");
            return Ok(info_node);
        }
        let info_node = load_info_node(configuration, process_definition_id)?;
        Ok(self.insert(process_definition_id, info_node))
    }

    pub fn element_properties(
        &mut self,
        configuration: &EngineConfiguration,
        element_id: &str,
        process_definition_id: &str,
    ) -> Result<Option<Value>> {
        let info_node = self.info_node(configuration, process_definition_id)?;
        Ok(lookup_element_properties(configuration, element_id, &info_node))
    }

    pub fn localized_properties(
        &mut self,
        configuration: &EngineConfiguration,
        language: &str,
        element_id: &str,
        process_definition_id: &str,
        use_fallback: bool,
    ) -> Result<Option<Value>> {
        let info_node = self.info_node(configuration, process_definition_id)?;
        lookup_localized_properties(configuration, language, element_id, &info_node, use_fallback)
    }
}

/// Fetch a definition's info node from the shared definition cache.
///
/// A miss means the deployment and the cache disagree; it is never retried.
pub(crate) fn load_info_node(
    configuration: &EngineConfiguration,
    process_definition_id: &str,
) -> Result<Arc<Value>> {
    debug!(process_definition_id, "loading definition info into override snapshot");
    match configuration.definition_info_cache().get(process_definition_id) {
        Some(cache_object) => Ok(cache_object.info_node),
        None => {
            error!(process_definition_id, "definition info cache miss");
            Err(ContextError::definition_info_missing(process_definition_id))
        }
    }
}

pub(crate) fn lookup_element_properties(
    configuration: &EngineConfiguration,
    element_id: &str,
    info_node: &Value,
) -> Option<Value> {
    configuration
        .override_service()
        .element_properties(element_id, info_node)
}

/// Localized lookup, walking the candidate locale list when `use_fallback`
/// is set and returning the first hit.
pub(crate) fn lookup_localized_properties(
    configuration: &EngineConfiguration,
    language: &str,
    element_id: &str,
    info_node: &Value,
    use_fallback: bool,
) -> Result<Option<Value>> {
    let service = configuration.override_service();
    if !use_fallback {
        return Ok(service.localized_element_properties(language, element_id, info_node));
    }

    for candidate in locale::fallback_tags(language, configuration.default_locale()) {
        if let Some(properties) =
            service.localized_element_properties(&candidate, element_id, info_node)
        {
            trace!(element_id, language, candidate = %candidate, "localized override found");
            return Ok(Some(properties));
        }
    }
    debug!(element_id, language, "no localized override in any candidate locale");
    Ok(None)
}
