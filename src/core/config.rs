use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::errors::{ContextError, Result};
use crate::locale::Locale;

/// Engine settings that shape how the context layer behaves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine name, used in logs
    pub name: String,
    /// Process-wide default locale, last stop of localized fallback
    pub default_locale: String,
    /// Fallback choice for callers that do not pick one
    pub localization_fallback: bool,
    /// Clear the override snapshot when the outermost command of a worker exits
    pub clear_override_snapshot_on_command_exit: bool,
    /// Emit history records from lifecycle listeners
    pub history_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            default_locale: "en_US".to_string(),
            localization_fallback: true,
            clear_override_snapshot_on_command_exit: true,
            history_enabled: true,
        }
    }
}

impl EngineSettings {
    /// Create a new builder
    pub fn builder() -> EngineSettingsBuilder {
        EngineSettingsBuilder::new()
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ContextError::configuration_field("engine name cannot be empty", "name"));
        }
        Locale::parse(&self.default_locale).map_err(|e| {
            ContextError::configuration_field(e.to_string(), "default_locale")
        })?;
        Ok(())
    }

    /// Settings for tests and local runs
    pub fn development() -> Self {
        Self {
            name: "development".to_string(),
            history_enabled: false,
            ..Default::default()
        }
    }

    /// Parse and validate settings from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ContextError::io(format!("read {}", path.display()), e))?;
        Self::from_yaml_str(&content)
    }
}

/// Builder for EngineSettings
pub struct EngineSettingsBuilder {
    settings: EngineSettings,
}

impl EngineSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: EngineSettings::default(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.settings.name = name.into();
        self
    }

    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.settings.default_locale = locale.into();
        self
    }

    pub fn localization_fallback(mut self, enabled: bool) -> Self {
        self.settings.localization_fallback = enabled;
        self
    }

    pub fn clear_override_snapshot_on_command_exit(mut self, enabled: bool) -> Self {
        self.settings.clear_override_snapshot_on_command_exit = enabled;
        self
    }

    pub fn history(mut self, enabled: bool) -> Self {
        self.settings.history_enabled = enabled;
        self
    }

    /// Build and validate the settings
    pub fn build(self) -> Result<EngineSettings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

impl Default for EngineSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
