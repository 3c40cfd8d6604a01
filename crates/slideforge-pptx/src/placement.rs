//! Geometry and the placement seam.
//!
//! Every visual element ends up on a slide through [`PlacementSink`]. The
//! signatures encode the height policy: charts and shapes are given a full
//! [`Rect`], tables and figures only an [`Anchor`] and size themselves.

use crate::chart::ChartSpec;
use crate::error::Result;
use crate::picture::FigureSpec;
use crate::shapes::ShapeSpec;
use crate::table::TableSpec;

/// An axis-aligned rectangle in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub const fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i64 {
        self.left + self.width
    }

    pub const fn bottom(&self) -> i64 {
        self.top + self.height
    }

    /// `a:off` + `a:ext`
    pub(crate) fn xfrm_children(&self) -> String {
        format!(
            r#"<a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/>"#,
            self.left, self.top, self.width, self.height
        )
    }
}

/// Top-left corner and width; the element decides its own height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Anchor {
    pub left: i64,
    pub top: i64,
    pub width: i64,
}

impl Anchor {
    pub const fn new(left: i64, top: i64, width: i64) -> Self {
        Self { left, top, width }
    }

    pub const fn with_height(self, height: i64) -> Rect {
        Rect::new(self.left, self.top, self.width, height)
    }
}

/// `p:cNvPr/@id` of a shape on its slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// What a placed element is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Chart,
    Table,
    Figure,
    Shape,
    Line,
}

/// Handle to an element placed on a slide
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub id: ShapeId,
    pub kind: ElementKind,
    /// Final frame, including the computed height of tables and figures
    pub rect: Rect,
    /// Caption text box below the element, if one was requested
    pub caption: Option<ShapeId>,
}

/// Receives placement calls
pub trait PlacementSink {
    fn place_chart(&mut self, spec: &ChartSpec, rect: Rect) -> Result<Placed>;

    fn place_table(&mut self, spec: &TableSpec, at: Anchor) -> Result<Placed>;

    fn place_figure(&mut self, spec: &FigureSpec, at: Anchor) -> Result<Placed>;

    fn place_shape(&mut self, spec: &ShapeSpec, rect: Rect) -> Result<Placed>;
}

/// Caption frame under `element`: `gap` below its bottom edge, same width
pub fn caption_rect(element: Rect, gap: i64, box_height: i64) -> Rect {
    Rect::new(element.left, element.bottom() + gap, element.width, box_height)
}

/// A caption counts only when it has visible text
pub(crate) fn caption_text(caption: &Option<String>) -> Option<&str> {
    caption.as_deref().filter(|c| !c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(100, 200, 300, 400);
        assert_eq!(r.right(), 400);
        assert_eq!(r.bottom(), 600);
        assert_eq!(
            r.xfrm_children(),
            r#"<a:off x="100" y="200"/><a:ext cx="300" cy="400"/>"#
        );
    }

    #[test]
    fn test_caption_sits_below_element() {
        let chart = Rect::new(0, 4_000_000, 4_500_000, 1_710_000);
        let caption = caption_rect(chart, 50_000, 240_000);
        assert_eq!(caption, Rect::new(0, 5_760_000, 4_500_000, 240_000));
    }

    #[test]
    fn test_blank_caption_is_ignored() {
        assert_eq!(caption_text(&Some("Fig 1".into())), Some("Fig 1"));
        assert_eq!(caption_text(&Some("  ".into())), None);
        assert_eq!(caption_text(&None), None);
    }
}
