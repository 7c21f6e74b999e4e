//! Error types for freewatch
//!
//! All modules use `FreewatchResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for freewatch operations
pub type FreewatchResult<T> = Result<T, FreewatchError>;

/// All errors that can occur in freewatch
#[derive(Error, Debug)]
pub enum FreewatchError {
    // Dedup cache errors
    #[error("Invalid identifier: identifiers must be non-empty")]
    InvalidIdentifier,

    #[error("Invalid cache state for {service}: {reason}")]
    InvalidState { service: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    // Polling errors
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Notification failed: {0}")]
    Notify(String),

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

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl FreewatchError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid cache state error
    pub fn invalid_state(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable on the next poll cycle
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Notify(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidState { .. } => Some("Run: freewatch cache clear <source>"),
            Self::ConfigInvalid { .. } => Some("Run: freewatch config init --force"),
            Self::SourceNotFound(_) => Some("Run: freewatch cache list"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FreewatchError::invalid_state("Denver", "capacity mismatch");
        assert_eq!(
            err.to_string(),
            "Invalid cache state for Denver: capacity mismatch"
        );
    }

    #[test]
    fn error_hint() {
        let err = FreewatchError::SourceNotFound("Boulder".to_string());
        assert_eq!(err.hint(), Some("Run: freewatch cache list"));
        assert_eq!(FreewatchError::InvalidIdentifier.hint(), None);
    }

    #[test]
    fn error_retryable() {
        assert!(FreewatchError::fetch("https://example.org", "timed out").is_retryable());
        assert!(!FreewatchError::InvalidIdentifier.is_retryable());
    }
}
