//! Native charts.
//!
//! A chart is a `c:chartSpace` part referenced from a graphic frame on the
//! slide. Data is written as literal caches (`c:strLit` / `c:numLit`), so no
//! embedded workbook is produced.

use std::fmt;
use std::str::FromStr;

use slideforge_ooxml::xml::escape_xml;

use crate::color::{ColorSpec, Rgb};
use crate::error::{PptxError, Result};
use crate::placement::{Rect, ShapeId};
use crate::slide::DeckStyle;

/// DrawingML chart namespace
pub const NS_CHART: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

/// Supported chart kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Column,
    ColumnStacked,
    Bar,
    BarStacked,
    Line,
    LineMarkers,
    Pie,
    Doughnut,
    Area,
    Radar,
    RadarFilled,
    Scatter,
    Bubble,
}

const CHART_TYPES: [(&str, ChartType); 13] = [
    ("column", ChartType::Column),
    ("column_stacked", ChartType::ColumnStacked),
    ("bar", ChartType::Bar),
    ("bar_stacked", ChartType::BarStacked),
    ("line", ChartType::Line),
    ("line_markers", ChartType::LineMarkers),
    ("pie", ChartType::Pie),
    ("doughnut", ChartType::Doughnut),
    ("area", ChartType::Area),
    ("radar", ChartType::Radar),
    ("radar_filled", ChartType::RadarFilled),
    ("scatter", ChartType::Scatter),
    ("bubble", ChartType::Bubble),
];

impl ChartType {
    pub fn names() -> Vec<&'static str> {
        CHART_TYPES.iter().map(|(name, _)| *name).collect()
    }

    pub fn name(&self) -> &'static str {
        CHART_TYPES
            .iter()
            .find(|(_, t)| t == self)
            .map(|(name, _)| *name)
            .unwrap_or("column")
    }

    /// Pie-like charts color points rather than series and have no axes
    pub fn is_pie(&self) -> bool {
        matches!(self, Self::Pie | Self::Doughnut)
    }

    /// Scatter and bubble charts plot numeric x values
    pub fn is_xy(&self) -> bool {
        matches!(self, Self::Scatter | Self::Bubble)
    }

    fn draws_lines(&self) -> bool {
        matches!(self, Self::Line | Self::LineMarkers | Self::Radar)
    }
}

impl FromStr for ChartType {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self> {
        CHART_TYPES
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, t)| *t)
            .ok_or_else(|| PptxError::unknown_kind("chart type", s, &Self::names()))
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data points of one series
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesValues {
    /// One value per category
    Values(Vec<f64>),
    /// Scatter points
    Xy(Vec<(f64, f64)>),
    /// Bubble points: x, y, size
    Xyz(Vec<(f64, f64, f64)>),
}

impl SeriesValues {
    fn kind(&self) -> &'static str {
        match self {
            Self::Values(_) => "category values",
            Self::Xy(_) => "x/y points",
            Self::Xyz(_) => "x/y/size points",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: SeriesValues,
}

/// Parameters of a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub title: Option<String>,
    pub legend: bool,
    /// Excel number format for the value axis and data labels
    pub number_format: Option<String>,
    pub data_labels: bool,
    /// Hundredths of a point; the contract default applies when unset
    pub font_size: Option<u32>,
    /// Series colors (points for pie and doughnut), applied in order
    pub colors: Vec<ColorSpec>,
    pub caption: Option<String>,
}

impl ChartSpec {
    pub fn new<I>(chart_type: ChartType, categories: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            chart_type,
            categories: categories.into_iter().map(Into::into).collect(),
            series: Vec::new(),
            title: None,
            legend: true,
            number_format: None,
            data_labels: false,
            font_size: None,
            colors: Vec::new(),
            caption: None,
        }
    }

    /// Parse the selector and start a spec
    pub fn named<I>(chart_type: &str, categories: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Ok(Self::new(chart_type.parse()?, categories))
    }

    pub fn with_series(mut self, name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        self.series.push(Series {
            name: name.into(),
            values: SeriesValues::Values(values.into_iter().collect()),
        });
        self
    }

    pub fn with_xy_series(
        mut self,
        name: impl Into<String>,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Self {
        self.series.push(Series {
            name: name.into(),
            values: SeriesValues::Xy(points.into_iter().collect()),
        });
        self
    }

    pub fn with_bubble_series(
        mut self,
        name: impl Into<String>,
        points: impl IntoIterator<Item = (f64, f64, f64)>,
    ) -> Self {
        self.series.push(Series {
            name: name.into(),
            values: SeriesValues::Xyz(points.into_iter().collect()),
        });
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_number_format(mut self, format: impl Into<String>) -> Self {
        self.number_format = Some(format.into());
        self
    }

    pub fn with_data_labels(mut self, on: bool) -> Self {
        self.data_labels = on;
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_colors<I>(mut self, colors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ColorSpec>,
    {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Check that the data fits the chart type
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(PptxError::invalid_argument(format!(
                "{} chart needs at least one series",
                self.chart_type
            )));
        }

        for series in &self.series {
            let ok = match (&series.values, self.chart_type) {
                (SeriesValues::Xy(_), ChartType::Scatter) => true,
                (SeriesValues::Xyz(_), ChartType::Bubble) => true,
                (SeriesValues::Values(values), t) if !t.is_xy() => {
                    if values.len() != self.categories.len() {
                        return Err(PptxError::invalid_argument(format!(
                            "series '{}' has {} values for {} categories",
                            series.name,
                            values.len(),
                            self.categories.len()
                        )));
                    }
                    true
                }
                _ => false,
            };
            if !ok {
                return Err(PptxError::invalid_argument(format!(
                    "series '{}' holds {}, which a {} chart cannot plot",
                    series.name,
                    series.values.kind(),
                    self.chart_type
                )));
            }
        }

        if !self.chart_type.is_xy() && self.categories.is_empty() {
            return Err(PptxError::invalid_argument(format!(
                "{} chart needs at least one category",
                self.chart_type
            )));
        }
        Ok(())
    }
}

/// `p:graphicFrame` that references a chart part
pub(crate) fn chart_frame_xml(id: ShapeId, rect: Rect, rel_id: &str) -> String {
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Chart {}"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm>{}</p:xfrm><a:graphic><a:graphicData uri="{ns}"><c:chart xmlns:c="{ns}" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
        id.0,
        id.0 - 1,
        rect.xfrm_children(),
        rel_id,
        ns = NS_CHART
    )
}

/// The `c:chartSpace` part
pub(crate) fn chart_space_xml(spec: &ChartSpec, style: &DeckStyle) -> Result<String> {
    spec.validate()?;
    let colors = spec
        .colors
        .iter()
        .map(|c| style.color(c))
        .collect::<Result<Vec<Rgb>>>()?;
    let font_size = spec.font_size.unwrap_or(style.contract.chart.font_size);

    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!(
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        NS_CHART
    ));
    xml.push_str(r#"<c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/>"#);
    xml.push_str("<c:chart>");

    match &spec.title {
        Some(title) => {
            xml.push_str(&title_xml(title, style.contract.chart.title_size, &style.contract.meta.locale));
            xml.push_str(r#"<c:autoTitleDeleted val="0"/>"#);
        }
        None => xml.push_str(r#"<c:autoTitleDeleted val="1"/>"#),
    }

    xml.push_str("<c:plotArea><c:layout/>");
    xml.push_str(&type_group_xml(spec, &colors));
    xml.push_str(&axes_xml(spec));
    xml.push_str("</c:plotArea>");

    if spec.legend {
        xml.push_str(r#"<c:legend><c:legendPos val="b"/><c:overlay val="0"/></c:legend>"#);
    }
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/>"#);
    xml.push_str("</c:chart>");

    xml.push_str(&format!(
        r#"<c:txPr><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr sz="{}"/></a:pPr><a:endParaRPr lang="en-US"/></a:p></c:txPr>"#,
        font_size
    ));
    xml.push_str("</c:chartSpace>");
    Ok(xml)
}

fn title_xml(title: &str, size: u32, lang: &str) -> String {
    format!(
        r#"<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/><a:p><a:pPr><a:defRPr sz="{sz}" b="1"/></a:pPr><a:r><a:rPr lang="{}" sz="{sz}" b="1"/><a:t>{}</a:t></a:r></a:p></c:rich></c:tx><c:overlay val="0"/></c:title>"#,
        escape_xml(lang),
        escape_xml(title),
        sz = size
    )
}

fn type_group_xml(spec: &ChartSpec, colors: &[Rgb]) -> String {
    let vary = if spec.chart_type.is_pie() { 1 } else { 0 };
    let series: String = spec
        .series
        .iter()
        .enumerate()
        .map(|(i, s)| series_xml(spec, i, s, colors))
        .collect();
    let labels = data_labels_xml(spec);
    let axes = r#"<c:axId val="1"/><c:axId val="2"/>"#;

    match spec.chart_type {
        ChartType::Column | ChartType::ColumnStacked | ChartType::Bar | ChartType::BarStacked => {
            let dir = match spec.chart_type {
                ChartType::Bar | ChartType::BarStacked => "bar",
                _ => "col",
            };
            let stacked = matches!(spec.chart_type, ChartType::ColumnStacked | ChartType::BarStacked);
            format!(
                r#"<c:barChart><c:barDir val="{}"/><c:grouping val="{}"/><c:varyColors val="0"/>{}{}<c:gapWidth val="150"/>{}{}</c:barChart>"#,
                dir,
                if stacked { "stacked" } else { "clustered" },
                series,
                labels,
                if stacked { r#"<c:overlap val="100"/>"# } else { "" },
                axes
            )
        }
        ChartType::Line | ChartType::LineMarkers => format!(
            r#"<c:lineChart><c:grouping val="standard"/><c:varyColors val="0"/>{}{}<c:marker val="1"/>{}</c:lineChart>"#,
            series, labels, axes
        ),
        ChartType::Pie => format!(
            r#"<c:pieChart><c:varyColors val="{}"/>{}{}<c:firstSliceAng val="0"/></c:pieChart>"#,
            vary, series, labels
        ),
        ChartType::Doughnut => format!(
            r#"<c:doughnutChart><c:varyColors val="{}"/>{}{}<c:firstSliceAng val="0"/><c:holeSize val="50"/></c:doughnutChart>"#,
            vary, series, labels
        ),
        ChartType::Area => format!(
            r#"<c:areaChart><c:grouping val="standard"/><c:varyColors val="0"/>{}{}{}</c:areaChart>"#,
            series, labels, axes
        ),
        ChartType::Radar | ChartType::RadarFilled => format!(
            r#"<c:radarChart><c:radarStyle val="{}"/><c:varyColors val="0"/>{}{}{}</c:radarChart>"#,
            if spec.chart_type == ChartType::RadarFilled {
                "filled"
            } else {
                "marker"
            },
            series,
            labels,
            axes
        ),
        ChartType::Scatter => format!(
            r#"<c:scatterChart><c:scatterStyle val="lineMarker"/><c:varyColors val="0"/>{}{}{}</c:scatterChart>"#,
            series, labels, axes
        ),
        ChartType::Bubble => format!(
            r#"<c:bubbleChart><c:varyColors val="0"/>{}{}<c:bubbleScale val="100"/><c:showNegBubbles val="0"/>{}</c:bubbleChart>"#,
            series, labels, axes
        ),
    }
}

fn solid(rgb: Rgb) -> String {
    format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, rgb.hex())
}

fn series_sp_pr(chart_type: ChartType, color: Option<Rgb>) -> String {
    match (chart_type, color) {
        (ChartType::Scatter, _) => r#"<c:spPr><a:ln w="19050"><a:noFill/></a:ln></c:spPr>"#.to_string(),
        (t, Some(rgb)) if t.draws_lines() => format!(
            r#"<c:spPr><a:ln w="28575" cap="rnd">{}<a:round/></a:ln></c:spPr>"#,
            solid(rgb)
        ),
        (t, Some(rgb)) if !t.is_pie() => format!("<c:spPr>{}</c:spPr>", solid(rgb)),
        _ => String::new(),
    }
}

fn series_xml(spec: &ChartSpec, index: usize, series: &Series, colors: &[Rgb]) -> String {
    let t = spec.chart_type;
    let color = colors.get(index).copied();
    let mut xml = format!(
        r#"<c:ser><c:idx val="{i}"/><c:order val="{i}"/><c:tx><c:v>{}</c:v></c:tx>"#,
        escape_xml(&series.name),
        i = index
    );
    xml.push_str(&series_sp_pr(t, color));

    match t {
        ChartType::Column | ChartType::ColumnStacked | ChartType::Bar | ChartType::BarStacked => {
            xml.push_str(r#"<c:invertIfNegative val="0"/>"#);
        }
        ChartType::Line => xml.push_str(r#"<c:marker><c:symbol val="none"/></c:marker>"#),
        ChartType::Scatter => {
            let fill = color.map(|rgb| format!("<c:spPr>{}</c:spPr>", solid(rgb))).unwrap_or_default();
            xml.push_str(&format!(
                r#"<c:marker><c:symbol val="circle"/><c:size val="7"/>{}</c:marker>"#,
                fill
            ));
        }
        ChartType::Bubble => xml.push_str(r#"<c:invertIfNegative val="0"/>"#),
        _ => {}
    }

    if t.is_pie() {
        for (point, rgb) in colors.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c:dPt><c:idx val="{}"/><c:bubble3D val="0"/><c:spPr>{}</c:spPr></c:dPt>"#,
                point,
                solid(*rgb)
            ));
        }
    }

    match &series.values {
        SeriesValues::Values(values) => {
            xml.push_str(&str_lit("c:cat", &spec.categories));
            xml.push_str(&num_lit("c:val", values.iter().copied(), spec.number_format.as_deref()));
        }
        SeriesValues::Xy(points) => {
            xml.push_str(&num_lit("c:xVal", points.iter().map(|p| p.0), None));
            xml.push_str(&num_lit("c:yVal", points.iter().map(|p| p.1), spec.number_format.as_deref()));
        }
        SeriesValues::Xyz(points) => {
            xml.push_str(&num_lit("c:xVal", points.iter().map(|p| p.0), None));
            xml.push_str(&num_lit("c:yVal", points.iter().map(|p| p.1), spec.number_format.as_deref()));
            xml.push_str(&num_lit("c:bubbleSize", points.iter().map(|p| p.2), None));
        }
    }

    match t {
        ChartType::Line | ChartType::LineMarkers | ChartType::Scatter => {
            xml.push_str(r#"<c:smooth val="0"/>"#)
        }
        ChartType::Bubble => xml.push_str(r#"<c:bubble3D val="0"/>"#),
        _ => {}
    }

    xml.push_str("</c:ser>");
    xml
}

fn str_lit(tag: &str, values: &[String]) -> String {
    let mut xml = format!(r#"<{}><c:strLit><c:ptCount val="{}"/>"#, tag, values.len());
    for (i, v) in values.iter().enumerate() {
        xml.push_str(&format!(r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, escape_xml(v)));
    }
    xml.push_str(&format!("</c:strLit></{}>", tag));
    xml
}

fn num_lit(tag: &str, values: impl ExactSizeIterator<Item = f64>, format: Option<&str>) -> String {
    let mut xml = format!(
        r#"<{}><c:numLit><c:formatCode>{}</c:formatCode><c:ptCount val="{}"/>"#,
        tag,
        escape_xml(format.unwrap_or("General")),
        values.len()
    );
    for (i, v) in values.enumerate() {
        xml.push_str(&format!(r#"<c:pt idx="{}"><c:v>{}</c:v></c:pt>"#, i, v));
    }
    xml.push_str(&format!("</c:numLit></{}>", tag));
    xml
}

fn data_labels_xml(spec: &ChartSpec) -> String {
    let num_fmt = match (&spec.number_format, spec.data_labels) {
        (Some(f), true) => format!(r#"<c:numFmt formatCode="{}" sourceLinked="0"/>"#, escape_xml(f)),
        _ => String::new(),
    };
    format!(
        r#"<c:dLbls>{}<c:showLegendKey val="0"/><c:showVal val="{}"/><c:showCatName val="0"/><c:showSerName val="0"/><c:showPercent val="0"/><c:showBubbleSize val="0"/></c:dLbls>"#,
        num_fmt,
        u8::from(spec.data_labels)
    )
}

fn axes_xml(spec: &ChartSpec) -> String {
    let t = spec.chart_type;
    if t.is_pie() {
        return String::new();
    }

    let num_fmt = spec
        .number_format
        .as_deref()
        .map(|f| format!(r#"<c:numFmt formatCode="{}" sourceLinked="0"/>"#, escape_xml(f)))
        .unwrap_or_default();
    let horizontal = matches!(t, ChartType::Bar | ChartType::BarStacked);
    let (cat_pos, val_pos) = if horizontal { ("l", "b") } else { ("b", "l") };

    if t.is_xy() {
        return format!(
            r#"<c:valAx><c:axId val="1"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="b"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="2"/><c:crosses val="autoZero"/><c:crossBetween val="midCat"/></c:valAx><c:valAx><c:axId val="2"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="l"/><c:majorGridlines/>{}<c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="1"/><c:crosses val="autoZero"/><c:crossBetween val="midCat"/></c:valAx>"#,
            num_fmt
        );
    }

    let between = if matches!(t, ChartType::Area) { "midCat" } else { "between" };
    format!(
        r#"<c:catAx><c:axId val="1"/><c:scaling><c:orientation val="{}"/></c:scaling><c:delete val="0"/><c:axPos val="{}"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="2"/><c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx><c:valAx><c:axId val="2"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="0"/><c:axPos val="{}"/><c:majorGridlines/>{}<c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="1"/><c:crosses val="autoZero"/><c:crossBetween val="{}"/></c:valAx>"#,
        if horizontal { "maxMin" } else { "minMax" },
        cat_pos,
        val_pos,
        num_fmt,
        between
    )
}
