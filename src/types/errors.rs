//! Error types for deepl-scraper.

use thiserror::Error;

/// Default result type for deepl-scraper.
pub type TranslatorResult<T> = Result<T, TranslatorError>;

/// Failure reported by a translation provider.
///
/// Rate-limit conditions are only distinguishable through `message`, which is
/// what the rate-limit classifier inspects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error from any message.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur in deepl-scraper.
#[derive(Error, Debug)]
pub enum TranslatorError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to translate text after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: ProviderError,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for TranslatorError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl TranslatorError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
}
