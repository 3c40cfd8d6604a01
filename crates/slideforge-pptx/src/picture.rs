//! Pictures placed as `p:pic`.
//!
//! Figures keep their aspect ratio: the caller fixes the width and the
//! height follows from the pixel dimensions unless given explicitly.

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, ImageReader};
use slideforge_ooxml::xml::escape_xml;

use crate::error::{PptxError, Result};
use crate::placement::{Anchor, Rect, ShapeId};

/// Where the image bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Parameters of a figure
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSpec {
    pub source: ImageSource,
    /// Explicit height in EMU; otherwise derived from the aspect ratio
    pub height: Option<i64>,
    /// Alternative text (`p:cNvPr/@descr`)
    pub description: Option<String>,
    pub caption: Option<String>,
}

impl FigureSpec {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(ImageSource::Path(path.into()))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::with_source(ImageSource::Bytes(bytes.into()))
    }

    fn with_source(source: ImageSource) -> Self {
        Self {
            source,
            height: None,
            description: None,
            caption: None,
        }
    }

    pub fn with_height(mut self, height: i64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Fails when the image file is missing or the fixed height is not positive
    pub fn check(&self) -> Result<()> {
        if let ImageSource::Path(path) = &self.source {
            if !path.is_file() {
                return Err(PptxError::image_error(format!(
                    "image not found: {}",
                    path.display()
                )));
            }
        }
        match self.height {
            Some(h) if h <= 0 => Err(PptxError::invalid_argument(format!(
                "figure height must be positive, got {}",
                h
            ))),
            _ => Ok(()),
        }
    }

    /// Read the bytes and probe the format and pixel size
    pub fn load(&self) -> Result<LoadedImage> {
        self.check()?;
        let bytes = match &self.source {
            ImageSource::Path(path) => std::fs::read(path)?,
            ImageSource::Bytes(bytes) => bytes.clone(),
        };
        LoadedImage::probe(bytes)
    }
}

/// Image bytes with their probed format
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    /// File extension used for the media part (`png`, `jpeg`)
    pub extension: &'static str,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    pub fn probe(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        let extension = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            other => {
                return Err(PptxError::image_error(format!(
                    "unsupported image format {:?}, expected PNG or JPEG",
                    other
                )))
            }
        };
        let (width_px, height_px) = ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()?;
        if width_px == 0 || height_px == 0 {
            return Err(PptxError::image_error("image has zero width or height"));
        }
        Ok(Self {
            bytes,
            extension,
            width_px,
            height_px,
        })
    }

    /// Height in EMU for the given width, keeping the aspect ratio
    pub fn height_for_width(&self, width: i64) -> i64 {
        (width as f64 * f64::from(self.height_px) / f64::from(self.width_px)).round() as i64
    }
}

/// Frame of a figure anchored at `at`
pub(crate) fn figure_rect(at: Anchor, spec: &FigureSpec, image: &LoadedImage) -> Result<Rect> {
    if at.width <= 0 {
        return Err(PptxError::invalid_argument(format!(
            "figure width must be positive, got {}",
            at.width
        )));
    }
    let height = match spec.height {
        Some(h) if h <= 0 => {
            return Err(PptxError::invalid_argument(format!(
                "figure height must be positive, got {}",
                h
            )))
        }
        Some(h) => h,
        None => image.height_for_width(at.width),
    };
    Ok(at.with_height(height))
}

/// `p:pic` referencing the media relationship `rel_id`
pub(crate) fn picture_xml(id: ShapeId, rect: Rect, rel_id: &str, description: Option<&str>) -> String {
    let descr = description
        .map(|d| format!(r#" descr="{}""#, escape_xml(d)))
        .unwrap_or_default();
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"{}/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm>{}</a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        id.0,
        id.0 - 1,
        descr,
        rel_id,
        rect.xfrm_children()
    )
}
