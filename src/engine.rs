//! Engine configuration: settings plus the collaborators the context layer
//! reaches through the active configuration.

use std::fmt;
use std::sync::Arc;

use crate::core::config::EngineSettings;
use crate::core::errors::{ContextError, Result};
use crate::locale::Locale;
use crate::overrides::{DefinitionInfoCache, DynamicOverrideService, JsonOverrideService};
use crate::parse::history::HistorySink;

/// Process-wide engine configuration, normally one shared instance
pub struct EngineConfiguration {
    settings: EngineSettings,
    default_locale: Locale,
    definition_info_cache: Arc<dyn DefinitionInfoCache>,
    override_service: Arc<dyn DynamicOverrideService>,
    history_sink: Option<Arc<dyn HistorySink>>,
}

impl EngineConfiguration {
    pub fn builder() -> EngineConfigurationBuilder {
        EngineConfigurationBuilder::new()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub fn definition_info_cache(&self) -> &Arc<dyn DefinitionInfoCache> {
        &self.definition_info_cache
    }

    pub fn override_service(&self) -> &Arc<dyn DynamicOverrideService> {
        &self.override_service
    }

    /// History sink, `None` when history is disabled or not wired
    pub fn history_sink(&self) -> Option<&Arc<dyn HistorySink>> {
        if self.settings.history_enabled {
            self.history_sink.as_ref()
        } else {
            None
        }
    }
}

impl fmt::Debug for EngineConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfiguration")
            .field("settings", &self.settings)
            .field("has_history_sink", &self.history_sink.is_some())
            .finish()
    }
}

/// Builder for EngineConfiguration
pub struct EngineConfigurationBuilder {
    settings: EngineSettings,
    definition_info_cache: Option<Arc<dyn DefinitionInfoCache>>,
    override_service: Arc<dyn DynamicOverrideService>,
    history_sink: Option<Arc<dyn HistorySink>>,
}

impl EngineConfigurationBuilder {
    pub fn new() -> Self {
        Self {
            settings: EngineSettings::default(),
            definition_info_cache: None,
            override_service: Arc::new(JsonOverrideService),
            history_sink: None,
        }
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.name = name.into();
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.settings.default_locale = locale.into();
        self
    }

    pub fn definition_info_cache(mut self, cache: Arc<dyn DefinitionInfoCache>) -> Self {
        self.definition_info_cache = Some(cache);
        self
    }

    pub fn override_service(mut self, service: Arc<dyn DynamicOverrideService>) -> Self {
        self.override_service = service;
        self
    }

    pub fn history_sink(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history_sink = Some(sink);
        self
    }

    /// Validate settings and require a definition cache
    pub fn build(self) -> Result<EngineConfiguration> {
        self.settings.validate()?;
        let default_locale = Locale::parse(&self.settings.default_locale)?;
        let definition_info_cache = self.definition_info_cache.ok_or_else(|| {
            ContextError::configuration_field(
                "a definition info cache is required",
                "definition_info_cache",
            )
        })?;

        Ok(EngineConfiguration {
            settings: self.settings,
            default_locale,
            definition_info_cache,
            override_service: self.override_service,
            history_sink: self.history_sink,
        })
    }
}

impl Default for EngineConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
