use thiserror::Error;

/// Unified error type for the process context layer
#[derive(Debug, Error)]
pub enum ContextError {
    /// A pop was issued against a stack with no entries
    #[error("Cannot pop from empty {stack} stack: mismatched push/pop")]
    EmptyStack { stack: &'static str },

    /// Override or localization lookups need an engine configuration on the stack
    #[error("No active engine configuration: {operation} requires one to be pushed first")]
    NoActiveEngineConfiguration { operation: String },

    /// The shared definition cache had nothing for a deployed definition
    #[error("No definition info cached for process definition {process_definition_id}")]
    DefinitionInfoMissing { process_definition_id: String },

    /// Locale tag could not be parsed
    #[error("Invalid locale tag '{tag}': {reason}")]
    InvalidLocale { tag: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// A lifecycle listener failed while handling an event
    #[error("Listener failed on '{event}' event: {message}")]
    Listener {
        event: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization errors
    #[error("Serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// IO errors
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl ContextError {
    /// Create an empty stack error
    pub fn empty_stack(stack: &'static str) -> Self {
        Self::EmptyStack { stack }
    }

    /// Create a missing engine configuration error
    pub fn no_engine_configuration<S: Into<String>>(operation: S) -> Self {
        Self::NoActiveEngineConfiguration {
            operation: operation.into(),
        }
    }

    /// Create a definition cache miss error
    pub fn definition_info_missing<S: Into<String>>(process_definition_id: S) -> Self {
        Self::DefinitionInfoMissing {
            process_definition_id: process_definition_id.into(),
        }
    }

    /// Create an invalid locale error
    pub fn invalid_locale<S: Into<String>, R: Into<String>>(tag: S, reason: R) -> Self {
        Self::InvalidLocale {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error with field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a listener error wrapping the listener's failure
    pub fn listener<S: Into<String>>(event: S, source: anyhow::Error) -> Self {
        Self::Listener {
            event: event.into(),
            message: source.to_string(),
            source: Some(source.into()),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Create an IO error
    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Fatal errors signal a caller or data-integrity bug, never a user error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EmptyStack { .. }
                | Self::NoActiveEngineConfiguration { .. }
                | Self::DefinitionInfoMissing { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyStack { .. } => "stack",
            Self::NoActiveEngineConfiguration { .. } => "setup",
            Self::DefinitionInfoMissing { .. } => "definition_cache",
            Self::InvalidLocale { .. } => "locale",
            Self::Configuration { .. } => "configuration",
            Self::Listener { .. } => "listener",
            Self::Serialization { .. } => "serialization",
            Self::Io { .. } => "io",
        }
    }
}

impl From<serde_yaml::Error> for ContextError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization("yaml", err)
    }
}

impl From<serde_json::Error> for ContextError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("json", err)
    }
}

/// Result type alias for the process context layer
pub type Result<T> = std::result::Result<T, ContextError>;
