//! Error types for validation runs
//!
//! Schema findings are data ([`crate::ValidationIssue`]); these errors are
//! for the run itself failing: unreadable inputs, schemas that cannot be
//! loaded, parts that cannot be rewritten.

use std::path::PathBuf;

use slideforge_ooxml::OoxmlError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// A schema document is not well-formed XML
    #[error("Failed to parse schema {path}: {source}")]
    SchemaXml {
        path: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A schema document is well-formed but not usable
    #[error("Invalid schema {path}: {message}")]
    Schema { path: String, message: String },

    /// A part could not be rewritten during repair
    #[error("Failed to repair {path}: {source}")]
    Repair {
        path: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("Schema directory not found: {}", .0.display())]
    SchemaDirNotFound(PathBuf),
}

impl ValidateError {
    pub fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display() {
        let err = ValidateError::schema("pml.xsd", "element without a name");
        assert_eq!(err.to_string(), "Invalid schema pml.xsd: element without a name");
    }

    #[test]
    fn test_ooxml_error_is_transparent() {
        let err: ValidateError = OoxmlError::MissingFile("ppt/presentation.xml".into()).into();
        assert_eq!(err.to_string(), "Required file not found: ppt/presentation.xml");
    }
}
