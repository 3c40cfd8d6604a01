//! Single-row auto-layout of visual elements.
//!
//! A [`VisualArea`] collects charts, tables, figures and shapes with a
//! relative weight, then places all of them side by side in one call to
//! [`VisualArea::render`]. Widths are split by weight after removing the
//! gaps; the last element takes whatever integer rounding left over, so the
//! row always ends exactly at the right edge of the area.
//!
//! Height policy per kind:
//!
//! - charts and shapes fill the area height, minus the caption reserve
//!   when they carry a caption
//! - tables and figures get only an anchor and size themselves
//!
//! Elements are dispatched through [`PlacementSink`], in insertion order.

use tracing::{debug, info};

use crate::chart::ChartSpec;
use crate::error::{PptxError, Result};
use crate::picture::FigureSpec;
use crate::placement::{caption_text, Anchor, Placed, PlacementSink, Rect};
use crate::shapes::ShapeSpec;
use crate::slide_contract::SlideContract;
use crate::table::TableSpec;

/// Rectangle and horizontal gap of an area, in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaBounds {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub gap: i64,
}

impl AreaBounds {
    /// The band between the content box and the bottom margin
    pub fn below_content(contract: &SlideContract, slide_height: i64) -> Self {
        let content = &contract.content;
        let visual = &contract.visual;
        let top = content.top + content.height + visual.top_gap;
        Self {
            left: content.left,
            top,
            width: content.width,
            height: slide_height - visual.bottom_margin - top,
            gap: visual.gap,
        }
    }

    /// Width, height and gap must not be negative
    pub fn check(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height), ("gap", self.gap)] {
            if value < 0 {
                return Err(PptxError::invalid_argument(format!(
                    "visual area {} must not be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn with_overrides(self, overrides: &AreaOverrides) -> Self {
        Self {
            left: overrides.left.unwrap_or(self.left),
            top: overrides.top.unwrap_or(self.top),
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            gap: overrides.gap.unwrap_or(self.gap),
        }
    }
}

/// Per-field replacements for the default bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaOverrides {
    pub left: Option<i64>,
    pub top: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub gap: Option<i64>,
}

/// An element waiting for [`VisualArea::render`]
#[derive(Debug, Clone, PartialEq)]
pub enum VisualElement {
    Chart(ChartSpec),
    Table(TableSpec),
    Figure(FigureSpec),
    Shape(ShapeSpec),
}

impl VisualElement {
    fn has_caption(&self) -> bool {
        let caption = match self {
            Self::Chart(spec) => &spec.caption,
            Self::Table(spec) => &spec.caption,
            Self::Figure(spec) => &spec.caption,
            Self::Shape(spec) => &spec.caption,
        };
        caption_text(caption).is_some()
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Chart(_) => "add_chart",
            Self::Table(_) => "add_table",
            Self::Figure(_) => "add_figure",
            Self::Shape(_) => "add_shape",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingElement {
    pub weight: f64,
    pub element: VisualElement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AreaState {
    Open,
    Rendered,
}

/// Layout session over a placement sink
#[derive(Debug)]
pub struct VisualArea<'s, S: PlacementSink + ?Sized> {
    sink: &'s mut S,
    bounds: AreaBounds,
    caption_reserve: i64,
    pending: Vec<PendingElement>,
    state: AreaState,
}

impl<'s, S: PlacementSink + ?Sized> VisualArea<'s, S> {
    /// `caption_reserve` is withheld from full-height elements with a caption
    pub fn new(sink: &'s mut S, bounds: AreaBounds, caption_reserve: i64) -> Result<Self> {
        bounds.check()?;
        Ok(Self {
            sink,
            bounds,
            caption_reserve,
            pending: Vec::new(),
            state: AreaState::Open,
        })
    }

    pub fn bounds(&self) -> AreaBounds {
        self.bounds
    }

    pub fn pending(&self) -> &[PendingElement] {
        &self.pending
    }

    pub fn is_rendered(&self) -> bool {
        self.state == AreaState::Rendered
    }

    fn push(&mut self, element: VisualElement, weight: f64) -> Result<&mut Self> {
        if self.state == AreaState::Rendered {
            return Err(PptxError::sequence(format!(
                "{}() cannot be called after render(); create a new visual area",
                element.label()
            )));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(PptxError::invalid_argument(format!(
                "weight must be a positive number, got {}",
                weight
            )));
        }
        self.pending.push(PendingElement { weight, element });
        Ok(self)
    }

    pub fn add_chart(&mut self, spec: ChartSpec, weight: f64) -> Result<&mut Self> {
        self.push(VisualElement::Chart(spec), weight)
    }

    pub fn add_table(&mut self, spec: TableSpec, weight: f64) -> Result<&mut Self> {
        self.push(VisualElement::Table(spec), weight)
    }

    pub fn add_figure(&mut self, spec: FigureSpec, weight: f64) -> Result<&mut Self> {
        self.push(VisualElement::Figure(spec), weight)
    }

    pub fn add_shape(&mut self, spec: ShapeSpec, weight: f64) -> Result<&mut Self> {
        self.push(VisualElement::Shape(spec), weight)
    }

    /// Place every pending element; handles come back in insertion order.
    ///
    /// Every element is laid out and checked before the first one reaches
    /// the sink, so a rejected row leaves the slide untouched and the area
    /// open.
    pub fn render(&mut self) -> Result<Vec<Placed>> {
        if self.state == AreaState::Rendered {
            return Err(PptxError::sequence(
                "render() can only be called once per visual area",
            ));
        }
        if self.pending.is_empty() {
            self.state = AreaState::Rendered;
            return Ok(Vec::new());
        }

        let b = self.bounds;
        let widths = partition_widths(b.left, b.width, b.gap, self.pending.iter().map(|p| p.weight));
        let mut slots = Vec::with_capacity(self.pending.len());
        let mut cursor = b.left;
        for (item, width) in self.pending.iter().zip(widths) {
            let reserve = if item.element.has_caption() {
                self.caption_reserve
            } else {
                0
            };
            let slot = Rect::new(cursor, b.top, width, b.height - reserve);
            check_slot(&item.element, slot)?;
            slots.push(slot);
            cursor += width + b.gap;
        }

        info!(elements = slots.len(), left = b.left, top = b.top, "rendering visual area");
        self.state = AreaState::Rendered;
        let pending = std::mem::take(&mut self.pending);
        let mut placed = Vec::with_capacity(pending.len());
        for (item, full) in pending.iter().zip(slots) {
            let anchor = Anchor::new(full.left, full.top, full.width);
            debug!(left = full.left, width = full.width, weight = item.weight, "placing {}", item.element.label());

            let handle = match &item.element {
                VisualElement::Chart(spec) => self.sink.place_chart(spec, full)?,
                VisualElement::Table(spec) => self.sink.place_table(spec, anchor)?,
                VisualElement::Figure(spec) => self.sink.place_figure(spec, anchor)?,
                VisualElement::Shape(spec) => self.sink.place_shape(spec, full)?,
            };
            placed.push(handle);
        }
        Ok(placed)
    }
}

/// Whether `element` fits its slot; full-height kinds need a positive height
fn check_slot(element: &VisualElement, slot: Rect) -> Result<()> {
    let full_height = matches!(element, VisualElement::Chart(_) | VisualElement::Shape(_));
    if slot.width <= 0 || (full_height && slot.height <= 0) {
        return Err(PptxError::invalid_argument(format!(
            "{}() element does not fit the visual area: {}x{} available",
            element.label(),
            slot.width,
            slot.height
        )));
    }
    match element {
        VisualElement::Chart(spec) => spec.validate(),
        VisualElement::Figure(spec) => spec.check(),
        VisualElement::Table(_) | VisualElement::Shape(_) => Ok(()),
    }
}

/// Split `width` by weight after removing `n - 1` gaps.
///
/// Every width but the last is `floor(available * w / total)`; the last
/// runs to `left + width` from wherever the cursor ended up.
pub fn partition_widths(
    left: i64,
    width: i64,
    gap: i64,
    weights: impl IntoIterator<Item = f64>,
) -> Vec<i64> {
    let weights: Vec<f64> = weights.into_iter().collect();
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = weights.iter().sum();
    let available = width - gap * (n as i64 - 1);

    let mut widths = Vec::with_capacity(n);
    let mut cursor = left;
    for (i, w) in weights.iter().enumerate() {
        let element_width = if i == n - 1 {
            left + width - cursor
        } else {
            (available as f64 * w / total).floor() as i64
        };
        widths.push(element_width);
        cursor += element_width + gap;
    }
    widths
}
