//! Error types for slide generation.

use slideforge_ooxml::OoxmlError;
use thiserror::Error;

/// Result type for slide operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while building or writing a deck
#[derive(Error, Debug)]
pub enum PptxError {
    /// Template file not found or inaccessible
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    /// Template is invalid or corrupted
    #[error("Invalid template: {reason}")]
    InvalidTemplate { reason: String },

    /// SlideContract configuration error
    #[error("SlideContract error: {reason}")]
    ContractError { reason: String },

    /// Named layout missing from a slide master
    #[error("Layout '{name}' not found in master {master}")]
    LayoutNotFound { name: String, master: usize },

    /// Template digest does not match the pinned value
    #[error("Template PPTX file hash mismatch. Expected {expected}, got {actual}")]
    TemplateHashMismatch { expected: String, actual: String },

    /// Image could not be read or decoded
    #[error("Image error: {reason}")]
    ImageError { reason: String },

    /// XML generation or parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// Package-level error
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error (for SlideContract)
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Color input matched none of the accepted forms
    #[error("Invalid color '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    /// Unknown selector for a closed set (chart type, shape type, dash, bullet)
    #[error("Unknown {kind} '{value}'. Supported: {supported}")]
    UnknownKind {
        kind: &'static str,
        value: String,
        supported: String,
    },

    /// Argument outside its allowed range
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// Operation called out of order
    #[error("{reason}")]
    Sequence { reason: String },

    /// Function used on the wrong kind of slide
    #[error("{function}() can only be used on {expected} slides; on {actual} slides use {use_instead}")]
    WrongSlideKind {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
        use_instead: &'static str,
    },

    /// 1-based slide index outside the deck
    #[error("slide {index} out of range (1-{count})")]
    SlideOutOfRange { index: usize, count: usize },
}

impl PptxError {
    /// Create a template not found error
    pub fn template_not_found(path: impl Into<String>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Create a contract error
    pub fn contract_error(reason: impl Into<String>) -> Self {
        Self::ContractError {
            reason: reason.into(),
        }
    }

    /// Create an image error
    pub fn image_error(reason: impl Into<String>) -> Self {
        Self::ImageError {
            reason: reason.into(),
        }
    }

    /// Create an unknown-selector error listing the accepted names
    pub fn unknown_kind(kind: &'static str, value: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnknownKind {
            kind,
            value: value.into(),
            supported: supported.join(", "),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a sequencing error
    pub fn sequence(reason: impl Into<String>) -> Self {
        Self::Sequence {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => "PPTX001",
            Self::InvalidTemplate { .. } => "PPTX002",
            Self::ContractError { .. } => "PPTX003",
            Self::LayoutNotFound { .. } => "PPTX004",
            Self::TemplateHashMismatch { .. } => "PPTX005",
            Self::ImageError { .. } => "PPTX006",
            Self::XmlError(_) => "PPTX007",
            Self::Ooxml(_) => "PPTX008",
            Self::IoError(_) => "PPTX009",
            Self::TomlError(_) => "PPTX010",
            Self::InvalidColor { .. } => "PPTX011",
            Self::UnknownKind { .. } => "PPTX012",
            Self::InvalidArgument { .. } => "PPTX013",
            Self::Sequence { .. } => "PPTX014",
            Self::WrongSlideKind { .. } => "PPTX015",
            Self::SlideOutOfRange { .. } => "PPTX016",
        }
    }
}

impl From<image::ImageError> for PptxError {
    fn from(err: image::ImageError) -> Self {
        Self::image_error(err.to_string())
    }
}
