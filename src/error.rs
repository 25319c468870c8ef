//! Error types for mdhtml library.

use std::io;
use thiserror::Error;

/// Result type alias for mdhtml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mdhtml library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A single transformer failed while rewriting its construct.
    ///
    /// `render` swallows these; only `try_render` in strict mode surfaces them.
    #[error("{stage} transform failed: {message}")]
    TransformFault {
        stage: &'static str,
        message: String,
    },

    /// Text encoding error.
    #[error("Text encoding error: {0}")]
    Encoding(String),

    /// Invalid render configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Creates a transform fault for the named stage.
    pub fn fault(stage: &'static str, message: impl Into<String>) -> Self {
        Error::TransformFault {
            stage,
            message: message.into(),
        }
    }

    /// Returns true if this error came from a transformer.
    pub fn is_transform_fault(&self) -> bool {
        matches!(self, Error::TransformFault { .. })
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
