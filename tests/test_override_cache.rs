//! Override snapshot memoization and localized fallback through the ambient API

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use process_context::context::{self, CommandContext};
use process_context::{
    ContextError, DynamicOverrideService, EngineConfiguration, EngineSettings,
    InMemoryDefinitionInfoCache,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Answers localized lookups only for `fr_FR` and records every language asked
#[derive(Default)]
struct FrenchOnlyService {
    asked: Mutex<Vec<String>>,
}

impl DynamicOverrideService for FrenchOnlyService {
    fn element_properties(&self, _element_id: &str, _info_node: &Value) -> Option<Value> {
        None
    }

    fn localized_element_properties(
        &self,
        language: &str,
        element_id: &str,
        _info_node: &Value,
    ) -> Option<Value> {
        self.asked.lock().push(language.to_string());
        (language == "fr_FR").then(|| json!({"name": format!("{element_id} (fr)")}))
    }
}

fn seeded_cache() -> Arc<InMemoryDefinitionInfoCache> {
    let cache = Arc::new(InMemoryDefinitionInfoCache::new());
    cache.insert(
        "vacation:2:17",
        json!({
            "bpmn": {
                "handleRequest": {"candidateGroups": ["management"]}
            },
            "localization": {
                "en": {"handleRequest": {"name": "Handle request"}},
                "de_DE": {"handleRequest": {"name": "Antrag bearbeiten"}}
            }
        }),
    );
    cache
}

fn engine(cache: Arc<InMemoryDefinitionInfoCache>, default_locale: &str) -> Arc<EngineConfiguration> {
    Arc::new(
        EngineConfiguration::builder()
            .definition_info_cache(cache)
            .default_locale(default_locale)
            .build()
            .unwrap(),
    )
}

#[test]
fn test_lookup_without_engine_configuration_is_fatal() {
    context::reset();
    let err = context::element_properties("handleRequest", "vacation:2:17").unwrap_err();
    assert!(matches!(err, ContextError::NoActiveEngineConfiguration { .. }));
    assert!(err.is_fatal());

    let err = context::localized_properties("en", "handleRequest", "vacation:2:17", true).unwrap_err();
    assert!(matches!(err, ContextError::NoActiveEngineConfiguration { .. }));
}

#[test]
fn test_one_fetch_per_definition_per_scope() {
    context::reset();
    let cache = seeded_cache();
    let _engine = context::enter_engine_configuration(engine(cache.clone(), "en_US"));

    let first = context::element_properties("handleRequest", "vacation:2:17").unwrap();
    let second = context::element_properties("handleRequest", "vacation:2:17").unwrap();
    let localized = context::localized_properties("en", "handleRequest", "vacation:2:17", false).unwrap();

    assert_eq!(first, Some(json!({"candidateGroups": ["management"]})));
    assert_eq!(first, second);
    assert_eq!(localized, Some(json!({"name": "Handle request"})));
    assert_eq!(cache.fetch_count("vacation:2:17"), 1);

    context::remove_override_snapshot();
    context::element_properties("handleRequest", "vacation:2:17").unwrap();
    assert_eq!(cache.fetch_count("vacation:2:17"), 2);
}

#[test]
fn test_cache_miss_is_fatal_and_not_memoized() {
    context::reset();
    let cache = seeded_cache();
    let _engine = context::enter_engine_configuration(engine(cache.clone(), "en_US"));

    for _ in 0..2 {
        let err = context::element_properties("task", "unknown:1:1").unwrap_err();
        assert!(matches!(err, ContextError::DefinitionInfoMissing { .. }));
    }
    assert_eq!(cache.fetch_count("unknown:1:1"), 2);
}

#[test]
fn test_fallback_uses_default_locale_chain() {
    context::reset();
    let service = Arc::new(FrenchOnlyService::default());
    let configuration = Arc::new(
        EngineConfiguration::builder()
            .definition_info_cache(seeded_cache())
            .override_service(service.clone())
            .default_locale("fr_FR")
            .build()
            .unwrap(),
    );
    let _engine = context::enter_engine_configuration(configuration);

    let found = context::localized_properties("en", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(found, Some(json!({"name": "handleRequest (fr)"})));
    assert_eq!(*service.asked.lock(), vec!["en", "fr_FR"]);

    service.asked.lock().clear();
    let found = context::localized_properties("en_US", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(found, Some(json!({"name": "handleRequest (fr)"})));
    assert_eq!(*service.asked.lock(), vec!["en_US", "en", "fr_FR"]);

    let direct = context::localized_properties("en", "handleRequest", "vacation:2:17", false).unwrap();
    assert_eq!(direct, None);
}

#[test]
fn test_fallback_prefers_requested_chain() {
    context::reset();
    let _engine = context::enter_engine_configuration(engine(seeded_cache(), "en_US"));

    let german = context::localized_properties("de_DE", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(german, Some(json!({"name": "Antrag bearbeiten"})));

    let swiss = context::localized_properties("de_CH", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(swiss, Some(json!({"name": "Handle request"})));

    let missing = context::localized_properties("de_CH", "unknownTask", "vacation:2:17", true).unwrap();
    assert_eq!(missing, None);

    let unparseable = context::localized_properties("??", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(unparseable, Some(json!({"name": "Handle request"})));
}

#[test]
fn test_fallback_tolerates_unparseable_language_tags() {
    context::reset();
    let cache = Arc::new(InMemoryDefinitionInfoCache::new());
    cache.insert(
        "leave:1:1",
        json!({"localization": {"en_US": {"approve": {"name": "Approve"}}}}),
    );
    let _engine = context::enter_engine_configuration(engine(cache, "en_US"));
    let approve = Some(json!({"name": "Approve"}));

    for language in ["en_US.UTF-8", "", "EN_US", "en-us"] {
        let found = context::localized_properties(language, "approve", "leave:1:1", true).unwrap();
        assert_eq!(found, approve, "language {language:?}");
    }

    let direct = context::localized_properties("en_US.UTF-8", "approve", "leave:1:1", false).unwrap();
    assert_eq!(direct, None);
    let direct = context::localized_properties("EN_US", "approve", "leave:1:1", false).unwrap();
    assert_eq!(direct, None);

    let missing = context::localized_properties("en_US.UTF-8", "reject", "leave:1:1", true).unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_collaborators_may_reenter_the_ambient_api() {
    struct CommandAwareService {
        seen: Mutex<Vec<Option<String>>>,
    }

    impl DynamicOverrideService for CommandAwareService {
        fn element_properties(&self, element_id: &str, info_node: &Value) -> Option<Value> {
            let command = context::command_context().map(|command| command.command.clone());
            self.seen.lock().push(command);
            assert!(context::engine_configuration().is_some());
            info_node["bpmn"].get(element_id).cloned()
        }

        fn localized_element_properties(
            &self,
            _language: &str,
            _element_id: &str,
            _info_node: &Value,
        ) -> Option<Value> {
            context::element_properties("handleRequest", "vacation:2:17").ok().flatten()
        }
    }

    context::reset();
    let service = Arc::new(CommandAwareService {
        seen: Mutex::new(Vec::new()),
    });
    let configuration = Arc::new(
        EngineConfiguration::builder()
            .definition_info_cache(seeded_cache())
            .override_service(service.clone())
            .build()
            .unwrap(),
    );
    let _engine = context::enter_engine_configuration(configuration);
    let _command = context::enter_command(Arc::new(CommandContext::new("GetTaskName")));

    let found = context::localized_properties("fr", "handleRequest", "vacation:2:17", false).unwrap();
    assert_eq!(found, Some(json!({"candidateGroups": ["management"]})));
    assert_eq!(*service.seen.lock(), vec![Some("GetTaskName".to_string())]);
}

#[test]
fn test_default_fallback_setting() {
    context::reset();
    let settings = EngineSettings::builder().localization_fallback(false).build().unwrap();
    let configuration = Arc::new(
        EngineConfiguration::builder()
            .settings(settings)
            .definition_info_cache(seeded_cache())
            .build()
            .unwrap(),
    );
    let _engine = context::enter_engine_configuration(configuration);

    let found = context::localized_properties_default("en_GB", "handleRequest", "vacation:2:17").unwrap();
    assert_eq!(found, None);
    let found = context::localized_properties("en_GB", "handleRequest", "vacation:2:17", true).unwrap();
    assert_eq!(found, Some(json!({"name": "Handle request"})));
}

#[test]
fn test_snapshot_scoped_to_outermost_command() {
    context::reset();
    let cache = seeded_cache();
    let configuration = engine(cache.clone(), "en_US");
    let _engine = context::enter_engine_configuration(configuration.clone());

    {
        let _outer = context::enter_command(Arc::new(
            CommandContext::new("CompleteTask").with_engine_configuration(configuration.clone()),
        ));
        context::element_properties("handleRequest", "vacation:2:17").unwrap();
        {
            let _inner = context::enter_command(Arc::new(CommandContext::new("GetTaskName")));
            context::localized_properties("en", "handleRequest", "vacation:2:17", true).unwrap();
        }
        context::element_properties("handleRequest", "vacation:2:17").unwrap();
        assert_eq!(cache.fetch_count("vacation:2:17"), 1);
    }

    {
        let _next = context::enter_command(Arc::new(CommandContext::new("CompleteTask")));
        context::element_properties("handleRequest", "vacation:2:17").unwrap();
    }
    assert_eq!(cache.fetch_count("vacation:2:17"), 2);
}

#[test]
fn test_removal_operations_are_idempotent() {
    context::reset();
    context::remove_override_snapshot();
    context::remove_override_snapshot();
    context::remove_job_worker_context();
    context::remove_job_worker_context();
    context::reset();
    context::reset();
    assert!(context::is_idle());
}
