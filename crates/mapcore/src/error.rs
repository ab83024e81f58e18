use std::path::PathBuf;
use thiserror::Error;

pub use crate::bmessage::BMessageError;
pub use crate::handle::HandleError;
pub use crate::listing::ListingError;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Handle error: {0}")]
    Handle(#[from] HandleError),

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("bMessage error: {0}")]
    BMessage(#[from] BMessageError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, MapError>;
