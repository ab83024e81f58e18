//! bMessage error types.

use thiserror::Error;

/// Errors that can occur while encoding or parsing a bMessage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BMessageError {
    /// The bMessage is malformed or uses a feature we do not handle.
    #[error("Invalid bMessage: {0}")]
    Format(String),

    /// The input is not valid UTF-8.
    #[error("bMessage is not valid UTF-8: {0}")]
    Encoding(String),
}

impl BMessageError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        BMessageError::Format(message.into())
    }
}

impl From<std::str::Utf8Error> for BMessageError {
    fn from(err: std::str::Utf8Error) -> Self {
        BMessageError::Encoding(err.to_string())
    }
}

/// Result type for bMessage operations.
pub type Result<T> = std::result::Result<T, BMessageError>;
