//! Error types for the Wandalf workbench.

use thiserror::Error;

/// A shared error type for the entire Wandalf workspace.
///
/// The first five variants form the user-facing taxonomy: they describe why a
/// user action could not complete. `State` never reaches the user; the
/// workbench turns it into a silent no-op. The remaining variants cover the
/// storage and configuration plumbing underneath.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WandalfError {
    /// The caller supplied something unusable (empty prompt, non-image upload).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A collaborator service answered, but not with success.
    #[error("Service error: {message}")]
    Service {
        message: String,
        details: Option<String>,
    },

    /// The upload service rejected the file or returned something unreadable.
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// The collaborator service could not be reached.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The operation needs an active session and there is none.
    #[error("State error: {0}")]
    State(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),
}

impl WandalfError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Service error without details
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
            details: None,
        }
    }

    /// Creates a Service error carrying the service's details payload
    pub fn service_with_details(message: impl Into<String>, details: Option<String>) -> Self {
        Self::Service {
            message: message.into(),
            details,
        }
    }

    /// Creates an UploadFailed error
    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::UploadFailed(message.into())
    }

    /// Creates a Connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Creates the State error for a missing active session
    pub fn no_active_session() -> Self {
        Self::State("No active session".to_string())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this is a State error
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Check if this error came from talking to a collaborator service.
    ///
    /// These are the failures that the workbench turns into assistant
    /// messages instead of returning them to the caller.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Service { .. } | Self::UploadFailed(_) | Self::Connectivity(_)
        )
    }

    /// Short text suitable for showing inside the conversation.
    ///
    /// Service errors carry their details on a second line when present.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service {
                message,
                details: Some(details),
            } => format!("{message}\n{details}"),
            Self::Service { message, .. } => message.clone(),
            Self::InvalidInput(message)
            | Self::UploadFailed(message)
            | Self::Connectivity(message)
            | Self::State(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WandalfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WandalfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WandalfError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WandalfError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for WandalfError {
    fn from(err: version_migrate::MigrationError) -> Self {
        Self::Migration(err.to_string())
    }
}

/// A type alias for `Result<T, WandalfError>`.
pub type Result<T> = std::result::Result<T, WandalfError>;
