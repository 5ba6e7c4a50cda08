//! Error types for the catalog crawler.

use thiserror::Error;

/// Errors that can occur while crawling or downloading.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Listing page could not be parsed
    #[error("Failed to parse listing page: {0}")]
    Parse(String),

    /// Module identifier that cannot be used as a file name
    #[error("Invalid module identifier: {0}")]
    InvalidIdentifier(String),

    /// IO error while saving a download
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
