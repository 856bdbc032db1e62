//! Error types for the save-dart-cache step
//!
//! All modules use `StepResult<T>` as their return type.

use thiserror::Error;

/// Result type alias for step operations
pub type StepResult<T> = Result<T, StepError>;

/// All errors that can occur while running the step
#[derive(Error, Debug)]
pub enum StepError {
    // Configuration errors
    #[error("required input not set: {name}")]
    ConfigMissing { name: &'static str },

    #[error("invalid {name} input: {value}: {reason}")]
    ConfigInvalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    // Cache key errors
    #[error("invalid cache key template {template:?}: {reason}")]
    KeyTemplate { template: String, reason: String },

    // Path errors
    #[error("home directory could not be determined, cannot expand {0}")]
    HomeDirUnavailable(String),

    // Save errors
    #[error("failed to save cache in step {step_id}: {source}")]
    SaveFailed {
        step_id: &'static str,
        #[source]
        source: Box<StepError>,
    },

    #[error("failed to create archive: {reason}")]
    ArchiveCreate { reason: String },

    // Process errors
    #[error("command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StepError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether this is a configuration error (bad or missing step input)
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigMissing { .. } | Self::ConfigInvalid { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing { name: "verbose" } => {
                Some("Set the verbose input to true or false")
            }
            Self::ConfigMissing {
                name: "compression_level",
            } => Some("Set the compression_level input to a value between 1 and 19"),
            Self::ConfigInvalid {
                name: "compression_level",
                ..
            } => Some("Compression level must be between 1 (fastest) and 19 (smallest)"),
            _ => None,
        }
    }
}
