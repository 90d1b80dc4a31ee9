//! Error types for OOXML operations

use thiserror::Error;

/// Errors that can occur while building, reading or writing a document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files, including in-memory XML buffers
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing or encoding XML content
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the package
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Heading level outside 0..=9
    #[error("Heading level not supported: {0}")]
    InvalidHeadingLevel(u8),

    /// Save was requested without a destination
    #[error("Destination file path is empty")]
    EmptyPath,

    /// Writer options could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
