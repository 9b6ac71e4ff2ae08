//! Dynamic override service
//!
//! Reads element properties and localized text out of a definition's info
//! document. The engine configuration carries one instance.

use serde_json::Value;

/// Top-level key holding per-element property overrides
pub const ELEMENT_PROPERTIES_NODE: &str = "bpmn";
/// Top-level key holding per-language, per-element localized text
pub const LOCALIZATION_NODE: &str = "localization";

/// Lookups into an info document
pub trait DynamicOverrideService: Send + Sync {
    fn element_properties(&self, element_id: &str, info_node: &Value) -> Option<Value>;

    fn localized_element_properties(
        &self,
        language: &str,
        element_id: &str,
        info_node: &Value,
    ) -> Option<Value>;
}

/// Service over the JSON info layout:
///
/// ```json
/// {
///   "bpmn": { "<elementId>": { ... } },
///   "localization": { "<language>": { "<elementId>": { ... } } }
/// }
/// ```
///
/// Empty objects count as "no overrides".
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOverrideService;

impl JsonOverrideService {
    fn non_empty(value: Option<&Value>) -> Option<Value> {
        match value {
            Some(Value::Null) | None => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value) => Some(value.clone()),
        }
    }
}

impl DynamicOverrideService for JsonOverrideService {
    fn element_properties(&self, element_id: &str, info_node: &Value) -> Option<Value> {
        Self::non_empty(
            info_node
                .get(ELEMENT_PROPERTIES_NODE)
                .and_then(|elements| elements.get(element_id)),
        )
    }

    fn localized_element_properties(
        &self,
        language: &str,
        element_id: &str,
        info_node: &Value,
    ) -> Option<Value> {
        Self::non_empty(
            info_node
                .get(LOCALIZATION_NODE)
                .and_then(|languages| languages.get(language))
                .and_then(|elements| elements.get(element_id)),
        )
    }
}
