//! Global error types for the SpaceChat notification client.
//!
//! All error categories across the workspace are unified into a single
//! `ScError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using ScError.
pub type ScResult<T> = Result<T, ScError>;

/// Unified error type covering all error categories in SpaceChat.
#[derive(Error, Debug)]
pub enum ScError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Storage errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Database integrity check failed.
    #[error("database integrity check failed: {0}")]
    IntegrityCheck(String),

    /// Key-value storage operation failed.
    #[error("storage error: {0}")]
    Storage(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Platform collaborator errors --
    /// The platform badge API rejected the update.
    #[error("badge error: {0}")]
    Badge(String),

    /// The navigation collaborator could not open a screen.
    #[error("navigation error: {0}")]
    Navigation(String),

    /// A deep link could not be parsed.
    #[error("invalid deep link: {0}")]
    InvalidDeepLink(String),

    /// An inbound message payload was malformed.
    #[error("invalid message payload: {0}")]
    InvalidPayload(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ScError {
    fn from(e: serde_json::Error) -> Self {
        ScError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ScError {
    fn from(e: toml::de::Error) -> Self {
        ScError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sc_error_display() {
        let err = ScError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn test_from_serde_json() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ScError = parse.unwrap_err().into();
        assert!(matches!(err, ScError::Serialization(_)));
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ScError = io.into();
        assert!(err.to_string().starts_with("io error"));
    }
}
