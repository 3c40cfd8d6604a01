//! # slideforge-ooxml
//!
//! OPC package plumbing shared by the slideforge crates.
//!
//! This crate provides functionality to:
//! - Read and write `.pptx` packages, from ZIP files or unpacked directories
//! - Parse and edit relationship parts and `[Content_Types].xml`
//! - Pretty-print and condense XML parts
//! - Pack, unpack and clean presentation packages
//!
//! ## Example: Unpacking a Deck
//!
//! ```no_run
//! use std::path::Path;
//! use slideforge_ooxml::{pack, unpack};
//!
//! let report = unpack(Path::new("deck.pptx"), Path::new("deck"))?;
//! println!("{} XML files", report.xml_files);
//! pack(Path::new("deck"), Path::new("deck-edited.pptx"))?;
//! # Ok::<(), slideforge_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod clean;
pub mod content_types;
pub mod error;
pub mod package;
pub mod relationships;
pub mod xml;

#[cfg(test)]
mod test_utils;

pub use archive::OoxmlArchive;
pub use clean::{clean, clean_dir, CleanReport};
pub use content_types::ContentTypes;
pub use error::{OoxmlError, Result};
pub use package::{pack, unpack, PackReport, UnpackReport};
pub use relationships::{Relationship, Relationships};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
