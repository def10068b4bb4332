//! Error types for research-loop.

use thiserror::Error;

/// Result type alias using research-loop's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the refinement loop.
#[derive(Error, Debug)]
pub enum Error {
    /// Memory storage error. Fatal to the run that hit it.
    #[error("Memory storage error: {0}")]
    MemoryStorage(String),

    /// Search provider transport or parse failure
    #[error("Idea source unavailable: {provider} - {message}")]
    SourceUnavailable { provider: String, message: String },

    /// Timeout during operation
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a source-unavailable error.
    pub fn source_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Whether this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MemoryStorage(_) | Self::Config(_) | Self::Internal(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::MemoryStorage(err.to_string())
    }
}
