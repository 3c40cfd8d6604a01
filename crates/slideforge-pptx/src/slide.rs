//! Slide DOM.
//!
//! A [`Slide`] is an in-memory `p:sld` under construction: a list of shapes
//! in z-order plus the charts and media it references. Every slide is tagged
//! with a [`SlideKind`]; operations that only make sense on one kind check
//! the tag and fail with a message naming the functions to use instead.
//!
//! Text for the content area is written through a [`TextFrame`], which
//! carries whether its section heading has been added.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::chart::{chart_frame_xml, chart_space_xml, ChartSpec};
use crate::color::{ColorSpec, Palette, Rgb};
use crate::error::{PptxError, Result};
use crate::picture::{figure_rect, picture_xml, FigureSpec};
use crate::placement::{
    caption_rect, caption_text, Anchor, ElementKind, Placed, PlacementSink, Rect, ShapeId,
};
use crate::shapes::{autoshape_xml, connector_xml, textbox_xml, LineSpec, ShapeSpec};
use crate::slide_contract::{BoxStyle, SlideContract};
use crate::table::{table_frame, TableSpec};
use crate::text::{
    build_runs, Align, BodyProps, BulletMarker, Inline, Paragraph, ParagraphProps, RunStyle,
    TextBody, Wrap,
};
use crate::visual_area::{AreaBounds, AreaOverrides, VisualArea};

/// Label in front of the date on a cover slide
pub const COVER_DATE_LABEL: &str = "\u{b0a0}\u{c9dc} : ";

/// Label in front of the presenter on a cover slide
pub const COVER_PRESENTER_LABEL: &str = "\u{bc1c}\u{d45c}\u{c790} : ";

/// Resolved contract shared by every slide of a deck
#[derive(Debug, Clone)]
pub struct DeckStyle {
    pub contract: SlideContract,
    pub palette: Palette,
}

impl DeckStyle {
    pub fn new(contract: SlideContract) -> Result<Self> {
        contract.validate()?;
        let palette = contract.palette()?;
        Ok(Self { contract, palette })
    }

    /// Resolve a color argument against the contract palette
    pub fn color(&self, spec: &ColorSpec) -> Result<Rgb> {
        spec.resolve(&self.palette)
    }

    fn color_str(&self, value: &str) -> Result<Rgb> {
        self.palette.resolve(value)
    }

    /// Run style in the contract fonts: bold Latin, regular East-Asian
    pub fn run_style(&self, size: u32, color: Option<Rgb>) -> RunStyle {
        let fonts = &self.contract.fonts;
        RunStyle {
            size,
            color,
            latin_font: fonts.latin.clone(),
            ea_font: fonts.east_asian.clone(),
            symbol_font: fonts.symbol.clone(),
            ascii_bold: true,
            unicode_bold: false,
            lang: self.contract.meta.locale.clone(),
        }
    }

    /// Marker for a bullet style name; `none` yields no marker
    pub fn bullet_marker(&self, name: &str) -> Result<Option<BulletMarker>> {
        let bullets = &self.contract.bullets;
        match name {
            "number" => Ok(Some(BulletMarker::AutoNumber(bullets.auto_number.clone()))),
            "none" => Ok(None),
            _ => bullets
                .styles
                .get(name)
                .map(|g| {
                    Some(BulletMarker::Char {
                        char: g.char.clone(),
                        font: g.font.clone(),
                        pitch_family: g.pitch_family.clone(),
                        charset: g.charset.clone(),
                    })
                })
                .ok_or_else(|| {
                    PptxError::unknown_kind("bullet style", name, &self.contract.bullet_names())
                }),
        }
    }

    fn box_run_style(&self, b: &BoxStyle, options: &BoxOptions) -> Result<RunStyle> {
        let size = options
            .font_size
            .or(b.font_size)
            .unwrap_or(self.contract.text.first_level.font_size);
        let color = match (&options.color, &b.color) {
            (Some(c), _) => Some(self.color(c)?),
            (None, Some(c)) => Some(self.color_str(c)?),
            (None, None) => None,
        };
        Ok(self.run_style(size, color))
    }
}

/// Which master a slide was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideKind {
    Cover,
    Content,
}

impl SlideKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Content => "content",
        }
    }

    fn functions(&self) -> &'static str {
        match self {
            Self::Cover => "add_cover_title(), add_cover_info()",
            Self::Content => "add_slide_title(), add_content_box()",
        }
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Overrides for a fixed text box; unset fields come from the contract
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxOptions {
    pub rect: Option<Rect>,
    /// Hundredths of a point
    pub font_size: Option<u32>,
    pub color: Option<ColorSpec>,
}

impl BoxOptions {
    pub fn at(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.color = Some(color.into());
        self
    }

    fn rect_or(&self, b: &BoxStyle) -> Rect {
        self.rect
            .unwrap_or(Rect::new(b.left, b.top, b.width, b.height))
    }
}

/// Options of a bullet paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulletOptions {
    /// Nesting depth, 0 is top level
    pub level: u32,
    /// Style name; the contract default for the level when unset
    pub bullet: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<ColorSpec>,
}

impl BulletOptions {
    pub fn level(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn bullet(mut self, name: impl Into<String>) -> Self {
        self.bullet = Some(name.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.color = Some(color.into());
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TextBox {
    pub id: ShapeId,
    pub rect: Rect,
    pub body: TextBody,
    pub has_section: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Element {
    TextBox(TextBox),
    Rendered { id: ShapeId, xml: String },
}

impl Element {
    fn id(&self) -> ShapeId {
        match self {
            Self::TextBox(b) => b.id,
            Self::Rendered { id, .. } => *id,
        }
    }

    fn to_xml(&self) -> String {
        match self {
            Self::TextBox(b) => textbox_xml(b.id, b.rect, &b.body),
            Self::Rendered { xml, .. } => xml.clone(),
        }
    }
}

/// A part the slide references through its relationships
#[derive(Debug, Clone)]
pub(crate) enum AttachmentKind {
    /// `c:chartSpace` XML
    Chart(String),
    Image {
        bytes: Vec<u8>,
        extension: &'static str,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Attachment {
    pub rel_id: String,
    pub kind: AttachmentKind,
}

/// A slide under construction
#[derive(Debug, Clone)]
pub struct Slide {
    style: Arc<DeckStyle>,
    kind: SlideKind,
    layout_part: String,
    slide_size: (i64, i64),
    elements: Vec<Element>,
    next_id: u32,
    attachments: Vec<Attachment>,
}

impl Slide {
    pub(crate) fn new(
        style: Arc<DeckStyle>,
        kind: SlideKind,
        layout_part: impl Into<String>,
        slide_size: (i64, i64),
    ) -> Self {
        Self {
            style,
            kind,
            layout_part: layout_part.into(),
            slide_size,
            elements: Vec::new(),
            next_id: 2,
            attachments: Vec::new(),
        }
    }

    pub fn kind(&self) -> SlideKind {
        self.kind
    }

    /// Part name of the layout this slide uses
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    /// Slide width and height in EMU
    pub fn size(&self) -> (i64, i64) {
        self.slide_size
    }

    pub fn style(&self) -> &DeckStyle {
        &self.style
    }

    pub fn shape_count(&self) -> usize {
        self.elements.len()
    }

    /// Text of every text box, in z-order
    pub fn texts(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::TextBox(b) => Some(b.body.text()),
                Element::Rendered { .. } => None,
            })
            .collect()
    }

    pub(crate) fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    fn require(&self, expected: SlideKind, function: &'static str) -> Result<()> {
        if self.kind == expected {
            return Ok(());
        }
        Err(PptxError::WrongSlideKind {
            function,
            expected: expected.name(),
            actual: self.kind.name(),
            use_instead: self.kind.functions(),
        })
    }

    fn next_shape_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn attach(&mut self, kind: AttachmentKind) -> String {
        // rId1 is the layout
        let rel_id = format!("rId{}", self.attachments.len() + 2);
        self.attachments.push(Attachment {
            rel_id: rel_id.clone(),
            kind,
        });
        rel_id
    }

    fn push_textbox(&mut self, rect: Rect, body: TextBody) -> usize {
        let id = self.next_shape_id();
        self.elements.push(Element::TextBox(TextBox {
            id,
            rect,
            body,
            has_section: false,
        }));
        self.elements.len() - 1
    }

    fn push_rendered(&mut self, xml: String, id: ShapeId) {
        self.elements.push(Element::Rendered { id, xml });
    }

    /// Title text box at the top of a content slide
    pub fn add_slide_title(&mut self, text: &str) -> Result<ShapeId> {
        self.add_slide_title_with(text, BoxOptions::default())
    }

    pub fn add_slide_title_with(&mut self, text: &str, options: BoxOptions) -> Result<ShapeId> {
        self.require(SlideKind::Content, "add_slide_title")?;
        let style = Arc::clone(&self.style);
        let b = &style.contract.title;
        let run_style = style.box_run_style(b, &options)?;

        let mut body = TextBody::default();
        body.next_paragraph()
            .push_runs(build_runs(text, &run_style, &style.palette));
        let index = self.push_textbox(options.rect_or(b), body);
        Ok(self.elements[index].id())
    }

    /// Main content text box of a content slide
    pub fn add_content_box(&mut self) -> Result<TextFrame<'_>> {
        self.add_content_box_at(None)
    }

    /// Content box at an explicit position
    pub fn add_content_box_at(&mut self, rect: Option<Rect>) -> Result<TextFrame<'_>> {
        self.require(SlideKind::Content, "add_content_box")?;
        let c = &self.style.contract.content;
        let rect = rect.unwrap_or(Rect::new(c.left, c.top, c.width, c.height));
        let body = TextBody::new(BodyProps {
            wrap: Wrap::Square,
            auto_fit: true,
            anchor: None,
        });
        let index = self.push_textbox(rect, body);
        Ok(TextFrame { slide: self, index })
    }

    /// Reopen the text box `id` for writing
    pub fn text_frame(&mut self, id: ShapeId) -> Result<TextFrame<'_>> {
        let index = self
            .elements
            .iter()
            .position(|e| matches!(e, Element::TextBox(b) if b.id == id))
            .ok_or_else(|| {
                PptxError::invalid_argument(format!("shape {} is not a text box on this slide", id.0))
            })?;
        Ok(TextFrame { slide: self, index })
    }

    /// Small caption text box; works on any slide kind
    pub fn add_caption(&mut self, text: &str, rect: Rect) -> Result<ShapeId> {
        self.add_caption_with(text, rect, BoxOptions::default())
    }

    pub fn add_caption_with(&mut self, text: &str, rect: Rect, options: BoxOptions) -> Result<ShapeId> {
        let style = Arc::clone(&self.style);
        let caption = &style.contract.caption;
        let color = match &options.color {
            Some(c) => style.color(c)?,
            None => style.color_str(&caption.color)?,
        };
        let run_style = style.run_style(options.font_size.unwrap_or(caption.font_size), Some(color));

        let mut body = TextBody::default();
        body.next_paragraph()
            .push_runs(build_runs(text, &run_style, &style.palette));
        let index = self.push_textbox(options.rect.unwrap_or(rect), body);
        Ok(self.elements[index].id())
    }

    /// Centered title of a cover slide.
    ///
    /// Any run of newlines becomes exactly two soft breaks, a full-size one
    /// followed by a half-size one.
    pub fn add_cover_title(&mut self, text: &str) -> Result<ShapeId> {
        self.add_cover_title_with(text, BoxOptions::default())
    }

    pub fn add_cover_title_with(&mut self, text: &str, options: BoxOptions) -> Result<ShapeId> {
        self.require(SlideKind::Cover, "add_cover_title")?;
        let style = Arc::clone(&self.style);
        let b = &style.contract.cover_title;
        let run_style = style.box_run_style(b, &options)?;

        let mut body = TextBody::new(cover_body());
        let p = body.next_paragraph();
        p.props = cover_props(Align::Center, 50_000);
        for (i, part) in text.split('\n').filter(|s| !s.is_empty()).enumerate() {
            if i > 0 {
                for size in [run_style.size, run_style.size / 2] {
                    p.content.push(Inline::Break {
                        lang: "en-US".to_string(),
                        size,
                    });
                }
            }
            p.push_runs(build_runs(part, &run_style, &style.palette));
        }

        let index = self.push_textbox(options.rect_or(b), body);
        Ok(self.elements[index].id())
    }

    /// Right-aligned date and presenter lines of a cover slide
    pub fn add_cover_info(&mut self, date: &str, presenter: &str) -> Result<ShapeId> {
        self.add_cover_info_with(date, presenter, BoxOptions::default())
    }

    pub fn add_cover_info_with(
        &mut self,
        date: &str,
        presenter: &str,
        options: BoxOptions,
    ) -> Result<ShapeId> {
        self.require(SlideKind::Cover, "add_cover_info")?;
        let style = Arc::clone(&self.style);
        let b = &style.contract.cover_info;
        let run_style = style.box_run_style(b, &options)?;

        let mut body = TextBody::new(cover_body());
        for line in [
            format!("{}{}", COVER_DATE_LABEL, date),
            format!("{}{}", COVER_PRESENTER_LABEL, presenter),
        ] {
            let p = body.next_paragraph();
            p.props = cover_props(Align::Right, 0);
            p.push_runs(build_runs(&line, &run_style, &style.palette));
        }

        let index = self.push_textbox(options.rect_or(b), body);
        Ok(self.elements[index].id())
    }

    /// Straight connector between two points
    pub fn place_line(&mut self, spec: &LineSpec) -> Result<Placed> {
        let style = Arc::clone(&self.style);
        let id = ShapeId(self.next_id);
        let xml = connector_xml(id, spec, &style)?;
        let id = self.next_shape_id();
        self.push_rendered(xml, id);
        debug!(id = id.0, "placed line");
        Ok(Placed {
            id,
            kind: ElementKind::Line,
            rect: spec.frame().0,
            caption: None,
        })
    }

    /// Visual area below the content box with contract defaults
    pub fn visual_area(&mut self) -> Result<VisualArea<'_, Self>> {
        self.visual_area_with(AreaOverrides::default())
    }

    pub fn visual_area_with(&mut self, overrides: AreaOverrides) -> Result<VisualArea<'_, Self>> {
        self.require(SlideKind::Content, "visual_area")?;
        let contract = &self.style.contract;
        let bounds = AreaBounds::below_content(contract, self.slide_size.1).with_overrides(&overrides);
        let reserve = contract.caption.reserve();
        VisualArea::new(self, bounds, reserve)
    }

    fn place_caption(&mut self, caption: &Option<String>, element: Rect) -> Result<Option<ShapeId>> {
        let Some(text) = caption_text(caption) else {
            return Ok(None);
        };
        let c = &self.style.contract.caption;
        let rect = caption_rect(element, c.gap, c.box_height);
        self.add_caption(text, rect).map(Some)
    }

    /// Serialize as a `p:sld` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            crate::constants::NS_DRAWING,
            crate::constants::NS_RELATIONSHIPS,
            crate::constants::NS_PRESENTATION
        ));
        xml.push_str(r#"<p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);
        for element in &self.elements {
            xml.push_str(&element.to_xml());
        }
        xml.push_str(r#"</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#);
        xml
    }
}

fn cover_body() -> BodyProps {
    BodyProps {
        wrap: Wrap::Square,
        auto_fit: true,
        anchor: None,
    }
}

fn cover_props(align: Align, space_before: u32) -> ParagraphProps {
    ParagraphProps {
        margin_left: Some(0),
        margin_right: Some(0),
        indent: Some(0),
        align: Some(align),
        ea_line_break: true,
        latin_line_break: true,
        hanging_punct: true,
        font_align_base: true,
        line_spacing: Some(150_000),
        space_before: Some(space_before),
        space_after: Some(0),
        bullet: Some(BulletMarker::Suppressed),
    }
}

fn check_rect(rect: Rect, what: &str) -> Result<()> {
    if rect.width <= 0 || rect.height <= 0 {
        return Err(PptxError::invalid_argument(format!(
            "{} needs a positive width and height, got {}x{}",
            what, rect.width, rect.height
        )));
    }
    Ok(())
}

impl PlacementSink for Slide {
    fn place_chart(&mut self, spec: &ChartSpec, rect: Rect) -> Result<Placed> {
        check_rect(rect, "chart")?;
        let style = Arc::clone(&self.style);
        let chart_xml = chart_space_xml(spec, &style)?;
        let rel_id = self.attach(AttachmentKind::Chart(chart_xml));
        let id = self.next_shape_id();
        self.push_rendered(chart_frame_xml(id, rect, &rel_id), id);
        let caption = self.place_caption(&spec.caption, rect)?;
        debug!(id = id.0, chart_type = %spec.chart_type, "placed chart");
        Ok(Placed {
            id,
            kind: ElementKind::Chart,
            rect,
            caption,
        })
    }

    fn place_table(&mut self, spec: &TableSpec, at: Anchor) -> Result<Placed> {
        check_rect(at.with_height(1), "table")?;
        let style = Arc::clone(&self.style);
        let id = ShapeId(self.next_id);
        let (xml, rect) = table_frame(id, at, spec, &style)?;
        let id = self.next_shape_id();
        self.push_rendered(xml, id);
        let caption = self.place_caption(&spec.caption, rect)?;
        debug!(id = id.0, rows = spec.rows.len(), height = rect.height, "placed table");
        Ok(Placed {
            id,
            kind: ElementKind::Table,
            rect,
            caption,
        })
    }

    fn place_figure(&mut self, spec: &FigureSpec, at: Anchor) -> Result<Placed> {
        let image = spec.load()?;
        let rect = figure_rect(at, spec, &image)?;
        let rel_id = self.attach(AttachmentKind::Image {
            bytes: image.bytes,
            extension: image.extension,
        });
        let id = self.next_shape_id();
        self.push_rendered(
            picture_xml(id, rect, &rel_id, spec.description.as_deref()),
            id,
        );
        let caption = self.place_caption(&spec.caption, rect)?;
        debug!(id = id.0, height = rect.height, "placed figure");
        Ok(Placed {
            id,
            kind: ElementKind::Figure,
            rect,
            caption,
        })
    }

    fn place_shape(&mut self, spec: &ShapeSpec, rect: Rect) -> Result<Placed> {
        check_rect(rect, "shape")?;
        let style = Arc::clone(&self.style);
        let id = ShapeId(self.next_id);
        let xml = autoshape_xml(id, rect, spec, &style)?;
        let id = self.next_shape_id();
        self.push_rendered(xml, id);
        let caption = self.place_caption(&spec.caption, rect)?;
        debug!(id = id.0, shape_type = %spec.shape_type, "placed shape");
        Ok(Placed {
            id,
            kind: ElementKind::Shape,
            rect,
            caption,
        })
    }
}

/// Writer for the paragraphs of a content box
#[derive(Debug)]
pub struct TextFrame<'s> {
    slide: &'s mut Slide,
    index: usize,
}

impl<'s> TextFrame<'s> {
    fn text_box(&mut self) -> Result<&mut TextBox> {
        match self.slide.elements.get_mut(self.index) {
            Some(Element::TextBox(b)) => Ok(b),
            _ => Err(PptxError::invalid_argument("text frame no longer refers to a text box")),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.slide.elements[self.index].id()
    }

    pub fn has_section(&self) -> bool {
        matches!(&self.slide.elements[self.index], Element::TextBox(b) if b.has_section)
    }

    pub fn text(&self) -> String {
        match &self.slide.elements[self.index] {
            Element::TextBox(b) => b.body.text(),
            Element::Rendered { .. } => String::new(),
        }
    }

    /// Section heading; a frame holds at most one
    pub fn add_section(&mut self, title: &str) -> Result<&mut Self> {
        self.add_section_with(title, None, None)
    }

    pub fn add_section_with(
        &mut self,
        title: &str,
        font_size: Option<u32>,
        color: Option<ColorSpec>,
    ) -> Result<&mut Self> {
        if self.has_section() {
            return Err(PptxError::sequence(
                "add_section() can only be called once per content box; \
                 create another slide with add_content_box() for a new section",
            ));
        }
        let style = Arc::clone(&self.slide.style);
        let text = &style.contract.text;
        let color = match color {
            Some(c) => style.color(&c)?,
            None => style.color_str(&text.section_color)?,
        };
        let run_style = style.run_style(font_size.unwrap_or(text.section_size), Some(color));

        let b = self.text_box()?;
        b.has_section = true;
        let p = b.body.next_paragraph();
        p.props.ea_line_break = true;
        p.props.hanging_punct = true;
        p.props.line_spacing = Some(text.line_spacing);
        p.push_runs(build_runs(
            &format!("{}{}", text.section_prefix, title),
            &run_style,
            &style.palette,
        ));
        Ok(self)
    }

    /// Bullet paragraph under the section
    pub fn add_bullet(&mut self, text: &str, options: BulletOptions) -> Result<&mut Self> {
        if !self.has_section() {
            return Err(PptxError::sequence(
                "add_bullet() requires a section: call add_section() on this content box first",
            ));
        }
        let style = Arc::clone(&self.slide.style);
        let contract = &style.contract;
        let level = options.level;
        let name = options
            .bullet
            .as_deref()
            .unwrap_or_else(|| contract.default_bullet(level));
        let marker = style.bullet_marker(name)?;

        let level_style = contract.level_style(level);
        let color = match &options.color {
            Some(c) => style.color(c)?,
            None => style.color_str(&level_style.color)?,
        };
        let run_style = style.run_style(options.font_size.unwrap_or(level_style.font_size), Some(color));

        let p = self.text_box()?.body.next_paragraph();
        p.props.margin_left = Some(contract.bullet_margin(level));
        p.props.indent = Some(level_style.indent);
        p.props.ea_line_break = true;
        p.props.hanging_punct = true;
        p.props.line_spacing = Some(contract.text.line_spacing);
        p.props.bullet = marker;
        p.push_runs(build_runs(text, &run_style, &style.palette));
        Ok(self)
    }

    /// Empty separator line
    pub fn add_spacer(&mut self) -> Result<&mut Self> {
        let style = Arc::clone(&self.slide.style);
        let p = self.text_box()?.body.next_paragraph();
        p.props.margin_left = Some(style.contract.text.margin_base);
        p.props.line_spacing = Some(style.contract.text.line_spacing);
        Ok(self)
    }

    /// Paragraphs written so far
    pub fn paragraphs(&self) -> &[Paragraph] {
        match &self.slide.elements[self.index] {
            Element::TextBox(b) => &b.body.paragraphs,
            Element::Rendered { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartType;
    use crate::shapes::ShapeType;

    fn slide(kind: SlideKind) -> Slide {
        let style = Arc::new(DeckStyle::new(SlideContract::default()).unwrap());
        Slide::new(style, kind, "ppt/slideLayouts/slideLayout2.xml", (9_144_000, 6_858_000))
    }

    #[test]
    fn test_content_only_functions_reject_cover() {
        let mut cover = slide(SlideKind::Cover);
        let err = cover.add_slide_title("x").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("add_slide_title() can only be used on content slides"));
        assert!(msg.contains("add_cover_title(), add_cover_info()"));
        assert!(cover.add_content_box().is_err());
        assert!(cover.visual_area().is_err());
    }

    #[test]
    fn test_cover_only_functions_reject_content() {
        let mut content = slide(SlideKind::Content);
        let msg = content.add_cover_title("x").unwrap_err().to_string();
        assert!(msg.contains("add_slide_title(), add_content_box()"));
        assert!(content.add_cover_info("2024", "me").is_err());
    }

    #[test]
    fn test_title_uses_contract_box() {
        let mut s = slide(SlideKind::Content);
        let id = s.add_slide_title("Overview").unwrap();
        assert_eq!(id, ShapeId(2));
        let xml = s.to_xml();
        assert!(xml.contains(r#"<a:off x="179512" y="154732"/>"#));
        assert!(xml.contains(r#"sz="2400""#));
        assert!(xml.contains(r#"<a:srgbClr val="072A5E"/>"#));
        assert_eq!(s.texts(), vec!["Overview".to_string()]);
    }

    #[test]
    fn test_bullet_requires_section() {
        let mut s = slide(SlideKind::Content);
        let mut frame = s.add_content_box().unwrap();
        let err = frame.add_bullet("early", BulletOptions::default()).unwrap_err();
        assert!(err.to_string().contains("call add_section()"));

        frame.add_section("Intro").unwrap();
        frame.add_bullet("point", BulletOptions::default()).unwrap();
        assert!(frame.add_section("Again").is_err());
    }

    #[test]
    fn test_section_reuses_first_paragraph() {
        let mut s = slide(SlideKind::Content);
        let mut frame = s.add_content_box().unwrap();
        frame.add_section("Intro").unwrap();
        assert_eq!(frame.paragraphs().len(), 1);
        assert_eq!(frame.text(), "\u{258c}Intro");
        let props = &frame.paragraphs()[0].props;
        assert_eq!(props.line_spacing, Some(130_000));
        assert!(props.ea_line_break && props.hanging_punct);
    }

    #[test]
    fn test_bullet_levels_and_defaults() {
        let mut s = slide(SlideKind::Content);
        let mut frame = s.add_content_box().unwrap();
        frame
            .add_section("S")
            .unwrap()
            .add_bullet("top", BulletOptions::default())
            .unwrap()
            .add_bullet("nested", BulletOptions::level(2))
            .unwrap()
            .add_bullet("numbered", BulletOptions::default().bullet("number"))
            .unwrap()
            .add_bullet("plain", BulletOptions::default().bullet("none"))
            .unwrap();

        let paras = frame.paragraphs();
        assert_eq!(paras[1].props.margin_left, Some(266_700));
        assert_eq!(paras[1].props.indent, Some(-174_625));
        assert!(matches!(&paras[1].props.bullet, Some(BulletMarker::Char { char, .. }) if char == "-"));

        assert_eq!(paras[2].props.margin_left, Some(266_700 + 2 * 182_563));
        assert_eq!(paras[2].props.indent, Some(-182_563));
        assert!(matches!(&paras[2].props.bullet, Some(BulletMarker::Char { char, .. }) if char == "n"));
        assert!(paras[2].runs().all(|r| r.size == 1200));

        assert_eq!(
            paras[3].props.bullet,
            Some(BulletMarker::AutoNumber("arabicPeriod".into()))
        );
        assert_eq!(paras[4].props.bullet, None);
    }

    #[test]
    fn test_unknown_bullet_lists_styles() {
        let mut s = slide(SlideKind::Content);
        let mut frame = s.add_content_box().unwrap();
        frame.add_section("S").unwrap();
        let msg = frame
            .add_bullet("x", BulletOptions::default().bullet("star"))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("Unknown bullet style 'star'"));
        assert!(msg.contains("arrow, check, circle, dash, none, number, square"));
    }

    #[test]
    fn test_spacer_sets_margin() {
        let mut s = slide(SlideKind::Content);
        let mut frame = s.add_content_box().unwrap();
        frame.add_section("S").unwrap().add_spacer().unwrap();
        let spacer = &frame.paragraphs()[1];
        assert_eq!(spacer.props.margin_left, Some(266_700));
        assert!(spacer.content.is_empty());
    }

    #[test]
    fn test_reopen_text_frame() {
        let mut s = slide(SlideKind::Content);
        let id = s.add_content_box().unwrap().id();
        s.text_frame(id).unwrap().add_section("Later").unwrap();
        assert!(s.text_frame(ShapeId(99)).is_err());
        assert_eq!(s.texts(), vec!["\u{258c}Later".to_string()]);
    }

    #[test]
    fn test_cover_title_collapses_newlines() {
        let mut s = slide(SlideKind::Cover);
        s.add_cover_title("First\n\n\nSecond").unwrap();
        let xml = s.to_xml();
        assert_eq!(xml.matches("<a:br>").count(), 2);
        assert!(xml.contains(r#"<a:br><a:rPr lang="en-US" sz="2000"/></a:br><a:br><a:rPr lang="en-US" sz="1000"/></a:br>"#));
        assert!(xml.contains(r#"algn="ctr""#));
        assert!(xml.contains("<a:spAutoFit/>"));
        assert!(xml.contains(r#"<a:spcBef><a:spcPct val="50000"/></a:spcBef>"#));
    }

    #[test]
    fn test_cover_info_lines() {
        let mut s = slide(SlideKind::Cover);
        s.add_cover_info("2024.01.01", "Kim").unwrap();
        let text = &s.texts()[0];
        assert_eq!(
            text,
            &format!("{}2024.01.01\n{}Kim", COVER_DATE_LABEL, COVER_PRESENTER_LABEL)
        );
        assert_eq!(s.to_xml().matches(r#"algn="r""#).count(), 2);
    }

    #[test]
    fn test_placed_chart_with_caption() {
        let mut s = slide(SlideKind::Content);
        let spec = ChartSpec::new(ChartType::Pie, ["a", "b"])
            .with_series("s", [1.0, 2.0])
            .with_caption("Figure 1");
        let rect = Rect::new(100, 4_500_000, 4_000_000, 1_500_000);
        let placed = s.place_chart(&spec, rect).unwrap();

        assert_eq!(placed.kind, ElementKind::Chart);
        assert_eq!(placed.caption, Some(ShapeId(3)));
        assert_eq!(s.attachments().len(), 1);
        assert_eq!(s.attachments()[0].rel_id, "rId2");
        let xml = s.to_xml();
        assert!(xml.contains(r#"<a:off x="100" y="6050000"/><a:ext cx="4000000" cy="240000"/>"#));
        assert!(xml.contains(r#"sz="1050""#));
    }

    #[test]
    fn test_blank_caption_places_nothing() {
        let mut s = slide(SlideKind::Content);
        let spec = ShapeSpec::new(ShapeType::Oval).with_caption("   ");
        let placed = s.place_shape(&spec, Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(placed.caption, None);
        assert_eq!(s.shape_count(), 1);
    }

    #[test]
    fn test_degenerate_rect_is_rejected() {
        let mut s = slide(SlideKind::Content);
        let spec = ShapeSpec::new(ShapeType::Rectangle);
        assert!(s.place_shape(&spec, Rect::new(0, 0, 0, 10)).is_err());
        assert_eq!(s.shape_count(), 0);
    }

    #[test]
    fn test_line_and_table_ids_are_sequential() {
        let mut s = slide(SlideKind::Cover);
        let line = s.place_line(&LineSpec::new((0, 0), (100, 100))).unwrap();
        let table = s
            .place_table(&TableSpec::new(vec![vec!["a"]]), Anchor::new(0, 0, 1000))
            .unwrap();
        assert_eq!(line.id, ShapeId(2));
        assert_eq!(table.id, ShapeId(3));
        assert!(s.to_xml().contains(r#"<p:cNvPr id="3" name="Table 2"/>"#));
    }
}
