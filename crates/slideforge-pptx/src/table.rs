//! Tables as `p:graphicFrame` / `a:tbl`.
//!
//! Tables size themselves: each row is `row_height` tall plus one
//! `line_height` for every extra line in its tallest cell, and the frame
//! height is the sum of the rows.

use slideforge_ooxml::xml::escape_xml;

use crate::error::{PptxError, Result};
use crate::placement::{Anchor, Rect, ShapeId};
use crate::slide::DeckStyle;
use crate::text::Paragraph;

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

/// Parameters of a table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    /// Cell text by row; `\n` splits a cell into paragraphs
    pub rows: Vec<Vec<String>>,
    pub first_row: bool,
    pub first_col: bool,
    /// Hundredths of a point
    pub header_size: Option<u32>,
    pub body_size: Option<u32>,
    /// Fixed height for every row instead of the line-count rule
    pub row_height: Option<i64>,
    pub caption: Option<String>,
}

impl TableSpec {
    pub fn new<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
            first_row: true,
            first_col: false,
            header_size: None,
            body_size: None,
            row_height: None,
            caption: None,
        }
    }

    pub fn with_first_row(mut self, on: bool) -> Self {
        self.first_row = on;
        self
    }

    pub fn with_first_col(mut self, on: bool) -> Self {
        self.first_col = on;
        self
    }

    pub fn with_header_size(mut self, size: u32) -> Self {
        self.header_size = Some(size);
        self
    }

    pub fn with_body_size(mut self, size: u32) -> Self {
        self.body_size = Some(size);
        self
    }

    pub fn with_row_height(mut self, height: i64) -> Self {
        self.row_height = Some(height);
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Number of columns, checking that the grid is rectangular
    pub fn column_count(&self) -> Result<usize> {
        let Some(first) = self.rows.first() else {
            return Err(PptxError::invalid_argument("table needs at least one row"));
        };
        let cols = first.len();
        if cols == 0 {
            return Err(PptxError::invalid_argument("table needs at least one column"));
        }
        if let Some((i, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(PptxError::invalid_argument(format!(
                "table row {} has {} cells, expected {}",
                i + 1,
                row.len(),
                cols
            )));
        }
        Ok(cols)
    }

    /// Height of each row in EMU
    pub fn row_heights(&self, base: i64, per_line: i64) -> Vec<i64> {
        self.rows
            .iter()
            .map(|row| match self.row_height {
                Some(h) => h,
                None => {
                    let lines = row
                        .iter()
                        .map(|cell| cell.split('\n').count())
                        .max()
                        .unwrap_or(1)
                        .max(1);
                    base + (lines as i64 - 1) * per_line
                }
            })
            .collect()
    }
}

/// Split `width` into `count` columns; the last takes the remainder
pub fn column_widths(width: i64, count: usize) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }
    let each = width / count as i64;
    let mut widths = vec![each; count];
    widths[count - 1] = width - each * (count as i64 - 1);
    widths
}

/// Build the table frame; returns the XML and the computed frame
pub(crate) fn table_frame(
    id: ShapeId,
    at: Anchor,
    spec: &TableSpec,
    style: &DeckStyle,
) -> Result<(String, Rect)> {
    let cols = spec.column_count()?;
    let metrics = &style.contract.table;
    if let Some(h) = spec.row_height {
        if h <= 0 {
            return Err(PptxError::invalid_argument(format!(
                "row_height must be positive, got {}",
                h
            )));
        }
    }

    let heights = spec.row_heights(metrics.row_height, metrics.line_height);
    let rect = at.with_height(heights.iter().sum());
    let header_size = spec.header_size.unwrap_or(metrics.header_size);
    let body_size = spec.body_size.unwrap_or(metrics.body_size);

    let mut xml = format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Table {}"/><p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr><p:xfrm>{}</p:xfrm><a:graphic><a:graphicData uri="{}"><a:tbl>"#,
        id.0,
        id.0 - 1,
        rect.xfrm_children(),
        TABLE_URI
    );

    xml.push_str(&format!(
        r#"<a:tblPr firstRow="{}" firstCol="{}" bandRow="1"><a:tableStyleId>{}</a:tableStyleId></a:tblPr>"#,
        u8::from(spec.first_row),
        u8::from(spec.first_col),
        escape_xml(&metrics.style_id)
    ));

    xml.push_str("<a:tblGrid>");
    for w in column_widths(rect.width, cols) {
        xml.push_str(&format!(r#"<a:gridCol w="{}"/>"#, w));
    }
    xml.push_str("</a:tblGrid>");

    for (r, (row, height)) in spec.rows.iter().zip(&heights).enumerate() {
        xml.push_str(&format!(r#"<a:tr h="{}">"#, height));
        for (c, cell) in row.iter().enumerate() {
            let header = (spec.first_row && r == 0) || (spec.first_col && c == 0);
            let size = if spec.first_row && r == 0 {
                header_size
            } else {
                body_size
            };
            let mut run_style = style.run_style(size, None);
            run_style.ascii_bold = header;
            run_style.unicode_bold = header;

            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>");
            for line in cell.split('\n') {
                let mut p = Paragraph::default();
                p.push_runs(crate::text::build_runs(line, &run_style, &style.palette));
                xml.push_str(&p.to_xml());
            }
            xml.push_str("</a:txBody><a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
    Ok((xml, rect))
}
