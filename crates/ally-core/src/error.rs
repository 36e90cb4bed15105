use thiserror::Error;

/// Top-level error type for the Ally system.
///
/// Subsystem crates define their own error types where they need richer
/// variants and convert into `AllyError` at crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AllyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AllyError {
    fn from(err: toml::de::Error) -> Self {
        AllyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AllyError {
    fn from(err: serde_json::Error) -> Self {
        AllyError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ally operations.
pub type Result<T> = std::result::Result<T, AllyError>;
