//! slideforge CLI - Command-line interface library
//!
//! This library provides the CLI functionality for slideforge:
//! - Render: slide images through LibreOffice and pdftoppm
//! - Pack / Unpack: edit a deck as a directory of pretty-printed XML
//! - Validate: XSD validation with auto-repair, optionally against an original
//! - Clean: drop parts no relationship reaches
//! - Add-slide: append a blank slide or duplicate one
//! - Bump-version: set the project version everywhere it is recorded
//!
//! # Library Usage
//!
//! ```ignore
//! use slideforge_cli::{validate_command, CliConfig};
//!
//! let config = CliConfig::load(None)?;
//! let report = validate_command(dir, Some(original), true, false, config.schemas()?)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! slideforge unpack deck.pptx deck/
//! slideforge validate deck/ --original deck.pptx --auto-repair
//! slideforge pack deck/ deck-edited.pptx --original deck.pptx
//! slideforge add-slide deck-edited.pptx --duplicate 2
//! slideforge render deck-edited.pptx --dpi 200
//! ```

pub mod app;
pub mod config;
pub mod render;
pub mod version;

// Re-export main entry point and types
pub use app::{
    add_slide_command, bump_version_command, clean_command, pack_command, render_command,
    unpack_command, validate_command,
};
pub use app::{init_logging, run_cli, AddKind};
pub use config::{CliConfig, RenderConfig};
