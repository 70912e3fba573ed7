//! Error types for idml-mt operations.

use thiserror::Error;

use crate::mt::MtError;

/// Errors that can occur while reading, translating or writing IDML stories.
///
/// Anchor count mismatches are not errors: they are reported as
/// [`StructuralMismatch`](crate::reinjection::StructuralMismatch) diagnostics
/// and the affected paragraph is left untouched.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The story markup could not be parsed into a tree.
    #[error("Malformed story '{story_id}': {message}")]
    MalformedSource { story_id: String, message: String },

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Translation error: {0}")]
    Translation(#[from] MtError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn malformed(story_id: &str, message: impl Into<String>) -> Self {
        Error::MalformedSource {
            story_id: story_id.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
