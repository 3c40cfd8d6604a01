//! Error types for OOXML package operations

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading, normalizing or writing a package
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading or writing the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An XML part could not be processed; carries the offending file
    #[error("Failed to parse {path}: {source}")]
    MalformedPart {
        path: String,
        #[source]
        source: quick_xml::Error,
    },

    /// Required file not found in archive
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Input path has the wrong shape (missing, not a directory, wrong extension)
    #[error("Invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    /// Invalid package structure
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),
}

impl OoxmlError {
    /// Attach the part name to an XML error
    pub fn malformed(path: impl Into<String>, source: quick_xml::Error) -> Self {
        Self::MalformedPart {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
