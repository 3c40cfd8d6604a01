//! Autoshapes, connectors and text boxes.

use std::fmt;
use std::str::FromStr;

use crate::color::{ColorSpec, Rgb};
use crate::constants::EMU_PER_POINT;
use crate::error::{PptxError, Result};
use crate::placement::{Rect, ShapeId};
use crate::slide::DeckStyle;
use crate::text::{Align, BodyProps, Paragraph, TextBody, Wrap};

/// Preset geometries accepted by `place_shape`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Rectangle,
    RoundedRectangle,
    Oval,
    Diamond,
    Triangle,
    Hexagon,
    Chevron,
    RightArrow,
    Pentagon,
    Star,
}

const SHAPE_TYPES: [(&str, ShapeType, &str); 10] = [
    ("rectangle", ShapeType::Rectangle, "rect"),
    ("rounded_rectangle", ShapeType::RoundedRectangle, "roundRect"),
    ("oval", ShapeType::Oval, "ellipse"),
    ("diamond", ShapeType::Diamond, "diamond"),
    ("triangle", ShapeType::Triangle, "triangle"),
    ("hexagon", ShapeType::Hexagon, "hexagon"),
    ("chevron", ShapeType::Chevron, "chevron"),
    ("right_arrow", ShapeType::RightArrow, "rightArrow"),
    ("pentagon", ShapeType::Pentagon, "homePlate"),
    ("star", ShapeType::Star, "star5"),
];

impl ShapeType {
    /// Selector names, in declaration order
    pub fn names() -> Vec<&'static str> {
        SHAPE_TYPES.iter().map(|(name, _, _)| *name).collect()
    }

    pub fn name(&self) -> &'static str {
        self.entry().0
    }

    /// `a:prstGeom/@prst`
    pub fn preset(&self) -> &'static str {
        self.entry().2
    }

    fn entry(&self) -> &'static (&'static str, ShapeType, &'static str) {
        // Every variant has a row
        SHAPE_TYPES
            .iter()
            .find(|(_, t, _)| t == self)
            .unwrap_or(&SHAPE_TYPES[0])
    }
}

impl FromStr for ShapeType {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self> {
        SHAPE_TYPES
            .iter()
            .find(|(name, _, _)| *name == s)
            .map(|(_, t, _)| *t)
            .ok_or_else(|| PptxError::unknown_kind("shape type", s, &Self::names()))
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dash patterns for lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    LongDash,
}

const DASH_STYLES: [(&str, DashStyle, &str); 5] = [
    ("solid", DashStyle::Solid, "solid"),
    ("dash", DashStyle::Dash, "dash"),
    ("dot", DashStyle::Dot, "sysDot"),
    ("dash_dot", DashStyle::DashDot, "dashDot"),
    ("long_dash", DashStyle::LongDash, "lgDash"),
];

impl DashStyle {
    pub fn names() -> Vec<&'static str> {
        DASH_STYLES.iter().map(|(name, _, _)| *name).collect()
    }

    /// `a:prstDash/@val`
    pub fn preset(&self) -> &'static str {
        DASH_STYLES
            .iter()
            .find(|(_, d, _)| d == self)
            .map(|(_, _, preset)| *preset)
            .unwrap_or("solid")
    }
}

impl FromStr for DashStyle {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self> {
        DASH_STYLES
            .iter()
            .find(|(name, _, _)| *name == s)
            .map(|(_, d, _)| *d)
            .ok_or_else(|| PptxError::unknown_kind("dash style", s, &Self::names()))
    }
}

/// Outer drop shadow
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: ColorSpec,
    /// Blur radius in points
    pub blur: f64,
    /// Offset distance in points
    pub distance: f64,
    /// Direction in degrees, clockwise from the x axis
    pub angle: f64,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            color: ColorSpec::Rgb(Rgb::BLACK),
            blur: 4.0,
            distance: 3.0,
            angle: 45.0,
            opacity: 0.4,
        }
    }
}

/// Parameters of an autoshape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSpec {
    pub shape_type: ShapeType,
    pub fill: Option<ColorSpec>,
    /// Fill transparency in percent (0-100)
    pub transparency: Option<u8>,
    pub line_color: Option<ColorSpec>,
    /// Outline width in points
    pub line_width: Option<f64>,
    pub shadow: Option<Shadow>,
    /// Centered text; `\n` starts a new paragraph
    pub text: Option<String>,
    /// Hundredths of a point
    pub font_size: Option<u32>,
    pub color: Option<ColorSpec>,
    pub bold: bool,
    pub caption: Option<String>,
}

impl ShapeSpec {
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            shape_type,
            fill: None,
            transparency: None,
            line_color: None,
            line_width: None,
            shadow: None,
            text: None,
            font_size: None,
            color: None,
            bold: false,
            caption: None,
        }
    }

    /// Parse the selector and start a spec
    pub fn named(shape_type: &str) -> Result<Self> {
        Ok(Self::new(shape_type.parse()?))
    }

    pub fn with_fill(mut self, fill: impl Into<ColorSpec>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    pub fn with_transparency(mut self, percent: u8) -> Self {
        self.transparency = Some(percent);
        self
    }

    pub fn with_line(mut self, color: impl Into<ColorSpec>, width_pt: f64) -> Self {
        self.line_color = Some(color.into());
        self.line_width = Some(width_pt);
        self
    }

    pub fn with_line_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.line_color = Some(color.into());
        self
    }

    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// A straight connector between two points
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub from: (i64, i64),
    pub to: (i64, i64),
    pub color: ColorSpec,
    /// Points
    pub width: f64,
    pub dash: DashStyle,
}

impl LineSpec {
    pub fn new(from: (i64, i64), to: (i64, i64)) -> Self {
        Self {
            from,
            to,
            color: ColorSpec::Rgb(Rgb::BLACK),
            width: 1.0,
            dash: DashStyle::Solid,
        }
    }

    pub fn with_color(mut self, color: impl Into<ColorSpec>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_width(mut self, width_pt: f64) -> Self {
        self.width = width_pt;
        self
    }

    pub fn with_dash(mut self, dash: DashStyle) -> Self {
        self.dash = dash;
        self
    }

    /// Bounding frame plus the flips that make it run from `from` to `to`
    pub fn frame(&self) -> (Rect, bool, bool) {
        let (x1, y1) = self.from;
        let (x2, y2) = self.to;
        let rect = Rect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs());
        (rect, x2 < x1, y2 < y1)
    }
}

pub(crate) fn points_to_emu(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

fn solid_fill(rgb: Rgb, alpha: Option<u32>) -> String {
    match alpha {
        Some(alpha) => format!(
            r#"<a:solidFill><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:solidFill>"#,
            rgb.hex(),
            alpha
        ),
        None => format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, rgb.hex()),
    }
}

/// `p:sp` with `txBox="1"`
pub(crate) fn textbox_xml(id: ShapeId, rect: Rect, body: &TextBody) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="TextBox {}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm>{}</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>{}</p:sp>"#,
        id.0,
        id.0 - 1,
        rect.xfrm_children(),
        body.to_xml("p:txBody")
    )
}

/// `p:sp` for an autoshape
pub(crate) fn autoshape_xml(
    id: ShapeId,
    rect: Rect,
    spec: &ShapeSpec,
    style: &DeckStyle,
) -> Result<String> {
    if let Some(t) = spec.transparency {
        if t > 100 {
            return Err(PptxError::invalid_argument(format!(
                "transparency must be between 0 and 100, got {}",
                t
            )));
        }
    }

    let mut sp_pr = format!(
        r#"<a:xfrm>{}</a:xfrm><a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
        rect.xfrm_children(),
        spec.shape_type.preset()
    );

    if let Some(fill) = &spec.fill {
        let alpha = spec.transparency.map(|t| (100 - u32::from(t)) * 1000);
        sp_pr.push_str(&solid_fill(style.color(fill)?, alpha));
    }

    match (&spec.line_color, spec.line_width) {
        (None, None) => {}
        (color, width) => {
            let w = width
                .map(|w| format!(r#" w="{}""#, points_to_emu(w)))
                .unwrap_or_default();
            match color {
                Some(c) => sp_pr.push_str(&format!(
                    "<a:ln{}>{}</a:ln>",
                    w,
                    solid_fill(style.color(c)?, None)
                )),
                None => sp_pr.push_str(&format!("<a:ln{}/>", w)),
            }
        }
    }

    if let Some(shadow) = &spec.shadow {
        let alpha = (shadow.opacity.clamp(0.0, 1.0) * 100_000.0).round() as u32;
        sp_pr.push_str(&format!(
            r#"<a:effectLst><a:outerShdw blurRad="{}" dist="{}" dir="{}" algn="ctr" rotWithShape="0"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:outerShdw></a:effectLst>"#,
            points_to_emu(shadow.blur),
            points_to_emu(shadow.distance),
            (shadow.angle.rem_euclid(360.0) * 60_000.0).round() as i64,
            style.color(&shadow.color)?.hex(),
            alpha
        ));
    }

    let body = shape_text_body(spec, style)?;

    Ok(format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{} {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr>{}</p:spPr><p:style><a:lnRef idx="1"><a:schemeClr val="accent1"/></a:lnRef><a:fillRef idx="3"><a:schemeClr val="accent1"/></a:fillRef><a:effectRef idx="2"><a:schemeClr val="accent1"/></a:effectRef><a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef></p:style>{}</p:sp>"#,
        id.0,
        shape_label(spec.shape_type),
        id.0 - 1,
        sp_pr,
        body.to_xml("p:txBody")
    ))
}

fn shape_label(shape_type: ShapeType) -> &'static str {
    match shape_type {
        ShapeType::Rectangle => "Rectangle",
        ShapeType::RoundedRectangle => "Rounded Rectangle",
        ShapeType::Oval => "Oval",
        ShapeType::Diamond => "Diamond",
        ShapeType::Triangle => "Isosceles Triangle",
        ShapeType::Hexagon => "Hexagon",
        ShapeType::Chevron => "Chevron",
        ShapeType::RightArrow => "Right Arrow",
        ShapeType::Pentagon => "Pentagon",
        ShapeType::Star => "5-Point Star",
    }
}

fn shape_text_body(spec: &ShapeSpec, style: &DeckStyle) -> Result<TextBody> {
    let mut body = TextBody::new(BodyProps {
        wrap: Wrap::Square,
        auto_fit: false,
        anchor: Some("ctr"),
    });
    let Some(text) = &spec.text else {
        return Ok(body);
    };

    let color = spec.color.as_ref().map(|c| style.color(c)).transpose()?;
    let size = spec
        .font_size
        .unwrap_or(style.contract.text.first_level.font_size);
    let mut run_style = style.run_style(size, color);
    run_style.ascii_bold = spec.bold;
    run_style.unicode_bold = spec.bold;

    body.paragraphs.clear();
    for line in text.split('\n') {
        let mut p = Paragraph::default();
        p.props.align = Some(Align::Center);
        p.push_runs(crate::text::build_runs(line, &run_style, &style.palette));
        body.paragraphs.push(p);
    }
    Ok(body)
}

/// `p:cxnSp` for a straight line
pub(crate) fn connector_xml(id: ShapeId, spec: &LineSpec, style: &DeckStyle) -> Result<String> {
    if spec.width <= 0.0 {
        return Err(PptxError::invalid_argument(format!(
            "line width must be positive, got {}",
            spec.width
        )));
    }
    let (rect, flip_h, flip_v) = spec.frame();
    let mut flips = String::new();
    if flip_h {
        flips.push_str(r#" flipH="1""#);
    }
    if flip_v {
        flips.push_str(r#" flipV="1""#);
    }

    Ok(format!(
        r#"<p:cxnSp><p:nvCxnSpPr><p:cNvPr id="{}" name="Straight Connector {}"/><p:cNvCxnSpPr/><p:nvPr/></p:nvCxnSpPr><p:spPr><a:xfrm{}>{}</a:xfrm><a:prstGeom prst="line"><a:avLst/></a:prstGeom><a:ln w="{}">{}<a:prstDash val="{}"/></a:ln></p:spPr></p:cxnSp>"#,
        id.0,
        id.0 - 1,
        flips,
        rect.xfrm_children(),
        points_to_emu(spec.width),
        solid_fill(style.color(&spec.color)?, None),
        spec.dash.preset()
    ))
}
