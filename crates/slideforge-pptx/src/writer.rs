//! PPTX assembly.
//!
//! [`PptxWriter`] appends slides to a copy of a template package. Slide,
//! chart and media part numbers continue after whatever the template already
//! holds, identical images are stored once, and `presentation.xml`,
//! `[Content_Types].xml`, the presentation relationships and the slide count
//! in `docProps/app.xml` are kept in step.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use slideforge_ooxml::content_types::{
    content_type_for_extension, CONTENT_TYPES_PART, CT_CHART, CT_SLIDE,
};
use slideforge_ooxml::relationships::{relative_target, rels_path_for};
use slideforge_ooxml::{ContentTypes, OoxmlArchive, Relationships};
use tracing::{debug, info};

use crate::error::{PptxError, Result};
use crate::slide::{AttachmentKind, Slide};
use crate::template::{collect_rel_ids, load_rels, sha256_hex, PRESENTATION_PART};

/// Main part content type of a presentation
pub const CT_PRESENTATION_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Main part content type of a template (`.potx`)
pub const CT_TEMPLATE_MAIN: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";

const APP_PART: &str = "docProps/app.xml";

/// Smallest `p:sldId/@id` PowerPoint accepts
const MIN_SLIDE_ID: u32 = 256;

fn slide_id_regex() -> &'static Regex {
    static SLIDE_ID: OnceLock<Regex> = OnceLock::new();
    SLIDE_ID.get_or_init(|| Regex::new(r#"<p:sldId\s[^>]*?\bid="(\d+)""#).unwrap())
}

fn slides_count_regex() -> &'static Regex {
    static SLIDES: OnceLock<Regex> = OnceLock::new();
    SLIDES.get_or_init(|| Regex::new(r"<Slides>\d+</Slides>").unwrap())
}

/// Appends slides to a package
#[derive(Debug)]
pub struct PptxWriter {
    archive: OoxmlArchive,
    content_types: ContentTypes,
    pres_rels: Relationships,
    presentation: String,
    next_slide: u32,
    next_chart: u32,
    next_media: u32,
    /// sha256 of media bytes -> part name
    media: HashMap<String, String>,
    added: usize,
}

impl PptxWriter {
    /// Start from a template or an existing presentation
    pub fn new(archive: OoxmlArchive) -> Result<Self> {
        let content_types = match archive.get(CONTENT_TYPES_PART) {
            Some(raw) => ContentTypes::parse(raw)?,
            None => {
                return Err(PptxError::invalid_template(format!(
                    "missing {}",
                    CONTENT_TYPES_PART
                )))
            }
        };
        let presentation = archive.get_string(PRESENTATION_PART)?.ok_or_else(|| {
            PptxError::invalid_template(format!("missing {}", PRESENTATION_PART))
        })?;
        let pres_rels = load_rels(&archive, PRESENTATION_PART)?;

        let next_slide = next_number(&archive, "ppt/slides/slide", ".xml");
        let next_chart = next_number(&archive, "ppt/charts/chart", ".xml");
        let next_media = next_number(&archive, "ppt/media/image", "");

        let mut media = HashMap::new();
        for name in archive.file_list().filter(|n| n.starts_with("ppt/media/")) {
            if let Some(bytes) = archive.get(name) {
                media.insert(sha256_hex(bytes), name.to_string());
            }
        }

        Ok(Self {
            archive,
            content_types,
            pres_rels,
            presentation,
            next_slide,
            next_chart,
            next_media,
            media,
            added: 0,
        })
    }

    /// Number of slides appended so far
    pub fn added(&self) -> usize {
        self.added
    }

    /// Append one slide; returns its part name
    pub fn add_slide(&mut self, slide: &Slide) -> Result<String> {
        let part = format!("ppt/slides/slide{}.xml", self.next_slide);
        self.next_slide += 1;

        let mut rels = Relationships::new();
        rels.add(
            Relationships::TYPE_SLIDE_LAYOUT,
            &relative_target(&part, slide.layout_part()),
        );

        for attachment in slide.attachments() {
            let (rel_type, target_part) = match &attachment.kind {
                AttachmentKind::Chart(xml) => {
                    let chart_part = format!("ppt/charts/chart{}.xml", self.next_chart);
                    self.next_chart += 1;
                    self.archive.set_string(chart_part.clone(), xml.clone());
                    self.content_types.set_override(&chart_part, CT_CHART);
                    (Relationships::TYPE_CHART, chart_part)
                }
                AttachmentKind::Image { bytes, extension } => {
                    (Relationships::TYPE_IMAGE, self.store_media(bytes, extension))
                }
            };
            let id = rels.add(rel_type, &relative_target(&part, &target_part));
            if id != attachment.rel_id {
                return Err(PptxError::invalid_argument(format!(
                    "relationship {} of {} was numbered {}",
                    attachment.rel_id, part, id
                )));
            }
        }

        self.archive.set_string(part.clone(), slide.to_xml());
        self.archive.set_string(rels_path_for(&part), rels.to_xml());
        self.register_slide(&part)?;
        debug!(part = %part, attachments = slide.attachments().len(), "added slide");
        Ok(part)
    }

    /// Register an already written slide part in the presentation
    pub(crate) fn register_slide(&mut self, part: &str) -> Result<()> {
        self.content_types.set_override(part, CT_SLIDE);
        let rel_id = self.pres_rels.add(
            Relationships::TYPE_SLIDE,
            &relative_target(PRESENTATION_PART, part),
        );
        self.presentation = append_slide_id(&self.presentation, &rel_id)?;
        self.added += 1;
        Ok(())
    }

    /// Reserve the next slide part name without writing it
    pub(crate) fn next_slide_part(&mut self) -> String {
        let part = format!("ppt/slides/slide{}.xml", self.next_slide);
        self.next_slide += 1;
        part
    }

    pub(crate) fn archive_mut(&mut self) -> &mut OoxmlArchive {
        &mut self.archive
    }

    fn store_media(&mut self, bytes: &[u8], extension: &str) -> String {
        let digest = sha256_hex(bytes);
        if let Some(existing) = self.media.get(&digest) {
            return existing.clone();
        }
        let part = format!("ppt/media/image{}.{}", self.next_media, extension);
        self.next_media += 1;
        self.archive.set(part.clone(), bytes.to_vec());
        self.content_types
            .ensure_default(extension, content_type_for_extension(extension));
        self.media.insert(digest, part.clone());
        part
    }

    /// Write the bookkeeping parts and return the finished package
    pub fn finish(mut self) -> Result<OoxmlArchive> {
        if self.content_types.content_type_of(PRESENTATION_PART) == Some(CT_TEMPLATE_MAIN) {
            self.content_types
                .set_override(PRESENTATION_PART, CT_PRESENTATION_MAIN);
        }

        let total = slide_id_regex().find_iter(&self.presentation).count();
        if let Some(app) = self.archive.get_string(APP_PART)? {
            let updated = slides_count_regex()
                .replace(&app, format!("<Slides>{}</Slides>", total).as_str())
                .into_owned();
            self.archive.set_string(APP_PART, updated);
        }

        self.archive
            .set_string(CONTENT_TYPES_PART, self.content_types.to_xml());
        self.archive
            .set_string(rels_path_for(PRESENTATION_PART), self.pres_rels.to_xml());
        self.archive.set_string(PRESENTATION_PART, self.presentation);

        info!(added = self.added, total, "presentation assembled");
        Ok(self.archive)
    }
}

/// First unused number N for parts named `{prefix}N{suffix}`
fn next_number(archive: &OoxmlArchive, prefix: &str, suffix: &str) -> u32 {
    archive
        .file_list()
        .filter_map(|name| name.strip_prefix(prefix))
        .filter_map(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            let tail = &rest[digits.len()..];
            let matches = if suffix.is_empty() {
                tail.starts_with('.')
            } else {
                tail == suffix
            };
            if matches {
                digits.parse::<u32>().ok()
            } else {
                None
            }
        })
        .max()
        .map_or(1, |n| n + 1)
}

/// Add `<p:sldId>` for `rel_id` to the slide list, creating the list if needed
fn append_slide_id(presentation: &str, rel_id: &str) -> Result<String> {
    let next_id = slide_id_regex()
        .captures_iter(presentation)
        .filter_map(|c| c.get(1)?.as_str().parse::<u32>().ok())
        .max()
        .map_or(MIN_SLIDE_ID, |max| (max + 1).max(MIN_SLIDE_ID));
    let entry = format!(r#"<p:sldId id="{}" r:id="{}"/>"#, next_id, rel_id);

    if let Some(pos) = presentation.find("</p:sldIdLst>") {
        let mut out = presentation.to_string();
        out.insert_str(pos, &entry);
        return Ok(out);
    }
    if presentation.contains("<p:sldIdLst/>") {
        return Ok(presentation.replacen(
            "<p:sldIdLst/>",
            &format!("<p:sldIdLst>{}</p:sldIdLst>", entry),
            1,
        ));
    }
    // p:sldIdLst sits directly before p:sldSz
    match presentation.find("<p:sldSz") {
        Some(pos) => {
            let mut out = presentation.to_string();
            out.insert_str(pos, &format!("<p:sldIdLst>{}</p:sldIdLst>", entry));
            Ok(out)
        }
        None => Err(PptxError::invalid_template(
            "presentation.xml has neither p:sldIdLst nor p:sldSz",
        )),
    }
}

/// Slide parts in presentation order
pub fn slide_parts(archive: &OoxmlArchive) -> Result<Vec<String>> {
    let presentation = archive
        .get(PRESENTATION_PART)
        .ok_or_else(|| PptxError::invalid_template(format!("missing {}", PRESENTATION_PART)))?;
    let rels = load_rels(archive, PRESENTATION_PART)?;
    collect_rel_ids(presentation, b"p:sldId")?
        .into_iter()
        .map(|id| {
            rels.get(&id)
                .map(|r| slideforge_ooxml::relationships::resolve_target(PRESENTATION_PART, &r.target))
                .ok_or_else(|| {
                    PptxError::invalid_template(format!("slide relationship {} is missing", id))
                })
        })
        .collect()
}
