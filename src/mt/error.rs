use thiserror::Error;

/// Error types for the machine translation module
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MtError {
    /// Missing or invalid provider configuration (API key, HTTP client)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request never got a response
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider answered with an error or an unusable response
    #[error("Translation error: {0}")]
    TranslationError(String),

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MtError::TranslationError(format!("Failed to decode response: {}", err))
        } else {
            MtError::NetworkError(err.to_string())
        }
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
