//! High-level deck API.
//!
//! ```rust,ignore
//! use slideforge_pptx::{BulletOptions, Presentation};
//!
//! let mut deck = Presentation::new()?;
//! let slide = deck.create_slide()?;
//! slide.add_slide_title("Quarterly review")?;
//! slide
//!     .add_content_box()?
//!     .add_section("Highlights")?
//!     .add_bullet("Revenue [green]up 12%[/green]", BulletOptions::default())?;
//! deck.save("review.pptx")?;
//! ```

use std::path::Path;
use std::sync::Arc;

use slideforge_ooxml::OoxmlArchive;
use tracing::info;

use crate::error::Result;
use crate::slide::{DeckStyle, Slide, SlideKind};
use crate::slide_contract::SlideContract;
use crate::template::PotxTemplate;
use crate::writer::PptxWriter;

/// A presentation being built on top of a template
#[derive(Debug, Clone)]
pub struct Presentation {
    template: PotxTemplate,
    style: Arc<DeckStyle>,
    slides: Vec<Slide>,
}

impl Presentation {
    /// House style on the built-in template
    pub fn new() -> Result<Self> {
        Self::with_contract(SlideContract::default())
    }

    /// Custom contract on the built-in template
    pub fn with_contract(contract: SlideContract) -> Result<Self> {
        let template = PotxTemplate::builtin(&contract)?;
        Self::from_template(template, contract)
    }

    /// Build on a loaded template
    pub fn from_template(template: PotxTemplate, contract: SlideContract) -> Result<Self> {
        let style = Arc::new(DeckStyle::new(contract)?);
        // fail early when the template lacks a layout the contract names
        for master in [style.contract.masters.cover, style.contract.masters.content] {
            template.layout_part(master, &style.contract.masters.blank_layout)?;
        }
        Ok(Self {
            template,
            style,
            slides: Vec::new(),
        })
    }

    pub fn style(&self) -> &DeckStyle {
        &self.style
    }

    pub fn template(&self) -> &PotxTemplate {
        &self.template
    }

    /// Add a content slide (content master, blank layout)
    pub fn create_slide(&mut self) -> Result<&mut Slide> {
        self.push_slide(SlideKind::Content)
    }

    /// Add a cover slide (cover master, blank layout)
    pub fn create_cover_slide(&mut self) -> Result<&mut Slide> {
        self.push_slide(SlideKind::Cover)
    }

    fn push_slide(&mut self, kind: SlideKind) -> Result<&mut Slide> {
        let masters = &self.style.contract.masters;
        let master = match kind {
            SlideKind::Cover => masters.cover,
            SlideKind::Content => masters.content,
        };
        let layout = self.template.layout_part(master, &masters.blank_layout)?;
        let slide = Slide::new(
            Arc::clone(&self.style),
            kind,
            layout,
            self.template.slide_size,
        );
        self.slides.push(slide);
        let last = self.slides.len() - 1;
        Ok(&mut self.slides[last])
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Slide by 0-based index
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Assemble the package in memory
    pub fn to_archive(&self) -> Result<OoxmlArchive> {
        let mut writer = PptxWriter::new(self.template.archive().clone())?;
        for slide in &self.slides {
            writer.add_slide(slide)?;
        }
        writer.finish()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_archive()?.to_bytes()?)
    }

    /// Write the `.pptx` file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.to_archive()?.write_to_file(path)?;
        info!(path = %path.display(), slides = self.slides.len(), "saved presentation");
        Ok(())
    }
}
