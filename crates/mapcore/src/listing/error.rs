//! Listing error types.

use thiserror::Error;

/// Errors that can occur while building a message listing.
#[derive(Error, Debug)]
pub enum ListingError {
    /// A single element holds content that cannot be encoded.
    #[error("Cannot encode listing entry {handle}: {reason}")]
    Format { handle: String, reason: String },

    /// A folder listing window starts past the last sub-folder.
    #[error("Folder listing offset {offset} is past {len} sub-folders")]
    Offset { offset: usize, len: usize },

    /// Writing to the XML sink failed. Fatal for the whole listing.
    #[error("XML write failed: {0}")]
    Xml(String),
}

/// Result type for listing operations.
pub type Result<T> = std::result::Result<T, ListingError>;
