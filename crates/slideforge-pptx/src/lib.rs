//! # slideforge-pptx
//!
//! Styled PowerPoint (PPTX) generation.
//!
//! Decks are built slide by slide on top of a template package and written
//! back out as a `.pptx`. The house style (fonts, box geometry, bullet
//! glyphs, palette, caption and layout metrics) lives in a [`SlideContract`].
//!
//! ## Features
//!
//! - **Content and cover slides**: titles, sectioned bullet lists, cover
//!   title and date/presenter block, each gated to its slide kind
//! - **Styled runs**: `[color]...[/color]` markup, Latin/East-Asian font
//!   split, `->` arrow glyph
//! - **Placement primitives**: charts, tables, figures, autoshapes and lines
//!   at explicit positions, with optional captions
//! - **VisualArea**: weighted single-row layout of visual elements
//! - **Editing**: append blank slides or duplicate an existing slide
//!
//! ## Example
//!
//! ```rust,ignore
//! use slideforge_pptx::{ChartSpec, Presentation, TableSpec};
//!
//! let mut deck = Presentation::new()?;
//! let slide = deck.create_slide()?;
//! slide.add_slide_title("Results")?;
//! slide
//!     .visual_area()?
//!     .add_chart(ChartSpec::named("column", ["Q1", "Q2"])?.with_series("Rev", [1.0, 2.0]), 2.0)?
//!     .add_table(TableSpec::new(vec![vec!["Q", "Rev"], vec!["Q1", "1.0"]]), 1.0)?
//!     .render()?;
//! deck.save("results.pptx")?;
//! ```

mod builtin;
pub mod chart;
pub mod color;
pub mod deck;
pub mod edit;
pub mod error;
pub mod picture;
pub mod placement;
pub mod shapes;
pub mod slide;
pub mod slide_contract;
pub mod table;
pub mod template;
pub mod text;
pub mod visual_area;
pub mod writer;

// Re-exports
pub use chart::{ChartSpec, ChartType, Series, SeriesValues};
pub use color::{resolve_color, ColorSpec, Palette, Rgb};
pub use deck::Presentation;
pub use edit::{add_blank_slide, add_blank_slide_file, duplicate_slide, duplicate_slide_file};
pub use error::{PptxError, Result};
pub use picture::{FigureSpec, ImageSource};
pub use placement::{Anchor, ElementKind, Placed, PlacementSink, Rect, ShapeId};
pub use shapes::{DashStyle, LineSpec, Shadow, ShapeSpec, ShapeType};
pub use slide::{BoxOptions, BulletOptions, DeckStyle, Slide, SlideKind, TextFrame};
pub use slide_contract::SlideContract;
pub use table::TableSpec;
pub use template::PotxTemplate;
pub use text::{parse_inline_markup, split_by_script, StyledSegment};
pub use visual_area::{AreaBounds, AreaOverrides, VisualArea};
pub use writer::PptxWriter;

/// Crate version, written to `docProps/app.xml`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PPTX-related constants
pub mod constants {
    /// Default slide width in EMU (914400 EMU = 1 inch, standard 10" width)
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Default slide height in EMU (standard 7.5" height for 4:3)
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// EMU per centimeter
    pub const EMU_PER_CM: i64 = 360_000;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
}
