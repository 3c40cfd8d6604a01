//! Template loading.
//!
//! A template is any PPTX/POTX package. Slides are appended to a copy of it,
//! so the template only has to provide masters with the blank layout the
//! contract names. Masters are indexed in `p:sldMasterIdLst` order and their
//! layouts in `p:sldLayoutIdLst` order.

use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sha2::{Digest, Sha256};
use slideforge_ooxml::relationships::{rels_path_for, resolve_target};
use slideforge_ooxml::{OoxmlArchive, Relationships};
use tracing::debug;

use crate::builtin::builtin_package;
use crate::constants::{DEFAULT_SLIDE_HEIGHT_EMU, DEFAULT_SLIDE_WIDTH_EMU};
use crate::error::{PptxError, Result};
use crate::slide_contract::SlideContract;

/// Main presentation part
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A slide layout of a master
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInfo {
    /// Part name, e.g. `ppt/slideLayouts/slideLayout7.xml`
    pub part: String,
    /// `p:cSld/@name`
    pub name: String,
}

/// A slide master and its layouts
#[derive(Debug, Clone, PartialEq)]
pub struct MasterInfo {
    pub part: String,
    pub layouts: Vec<LayoutInfo>,
}

/// A loaded template package
#[derive(Debug, Clone)]
pub struct PotxTemplate {
    /// Template file path (if loaded from file)
    pub path: Option<String>,

    /// Slide dimensions (width, height) in EMU
    pub slide_size: (i64, i64),

    masters: Vec<MasterInfo>,
    archive: OoxmlArchive,
    sha256: Option<String>,
}

impl PotxTemplate {
    /// Load a template from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PptxError::template_not_found(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        let mut template = Self::from_bytes(&data)?;
        template.path = Some(path.display().to_string());
        Ok(template)
    }

    /// Load a template and check its SHA-256 digest (hex, case-insensitive)
    pub fn from_file_verified(path: impl AsRef<Path>, expected_sha256: &str) -> Result<Self> {
        let template = Self::from_file(path)?;
        let actual = template.sha256().unwrap_or_default();
        if !actual.eq_ignore_ascii_case(expected_sha256.trim()) {
            return Err(PptxError::TemplateHashMismatch {
                expected: expected_sha256.trim().to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(template)
    }

    /// Load a template from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let archive = OoxmlArchive::from_reader(Cursor::new(data))?;
        let mut template = Self::from_archive(archive)?;
        template.sha256 = Some(sha256_hex(data));
        Ok(template)
    }

    /// The built-in two-master template
    pub fn builtin(contract: &SlideContract) -> Result<Self> {
        Self::from_archive(builtin_package(contract))
    }

    /// Read masters, layouts and slide size from an in-memory package
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let presentation = archive
            .get(PRESENTATION_PART)
            .ok_or_else(|| PptxError::invalid_template(format!("missing {}", PRESENTATION_PART)))?;

        let slide_size = extract_slide_size(presentation)?;
        let master_ids = collect_rel_ids(presentation, b"p:sldMasterId")?;
        let pres_rels = load_rels(&archive, PRESENTATION_PART)?;

        let mut masters = Vec::new();
        for id in master_ids {
            let rel = pres_rels.get(&id).ok_or_else(|| {
                PptxError::invalid_template(format!("slide master relationship {} is missing", id))
            })?;
            let part = resolve_target(PRESENTATION_PART, &rel.target);
            masters.push(read_master(&archive, part)?);
        }

        if masters.is_empty() {
            return Err(PptxError::invalid_template("template has no slide masters"));
        }

        debug!(
            masters = masters.len(),
            width = slide_size.0,
            height = slide_size.1,
            "loaded template"
        );

        Ok(Self {
            path: None,
            slide_size,
            masters,
            archive,
            sha256: None,
        })
    }

    /// Masters in presentation order
    pub fn masters(&self) -> &[MasterInfo] {
        &self.masters
    }

    /// Part name of the layout called `name` in master `master`
    pub fn layout_part(&self, master: usize, name: &str) -> Result<&str> {
        self.masters
            .get(master)
            .and_then(|m| m.layouts.iter().find(|l| l.name == name))
            .map(|l| l.part.as_str())
            .ok_or_else(|| PptxError::LayoutNotFound {
                name: name.to_string(),
                master,
            })
    }

    /// Hex SHA-256 of the template file, when loaded from bytes
    pub fn sha256(&self) -> Option<&str> {
        self.sha256.as_deref()
    }

    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    pub fn into_archive(self) -> OoxmlArchive {
        self.archive
    }
}

/// Lowercase hex SHA-256 of `data`
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

pub(crate) fn load_rels(archive: &OoxmlArchive, part: &str) -> Result<Relationships> {
    match archive.get(&rels_path_for(part)) {
        Some(raw) => Ok(Relationships::parse(raw)?),
        None => Ok(Relationships::new()),
    }
}

fn read_master(archive: &OoxmlArchive, part: String) -> Result<MasterInfo> {
    let xml = archive
        .get(&part)
        .ok_or_else(|| PptxError::invalid_template(format!("missing {}", part)))?;
    let rels = load_rels(archive, &part)?;

    let mut layouts = Vec::new();
    for id in collect_rel_ids(xml, b"p:sldLayoutId")? {
        let Some(rel) = rels.get(&id) else {
            continue;
        };
        let layout_part = resolve_target(&part, &rel.target);
        let Some(layout_xml) = archive.get(&layout_part) else {
            continue;
        };
        let name = parse_layout_name(layout_xml)?.unwrap_or_default();
        layouts.push(LayoutInfo {
            part: layout_part,
            name,
        });
    }

    Ok(MasterInfo { part, layouts })
}

/// Extract `p:sldSz` from presentation.xml
fn extract_slide_size(xml: &[u8]) -> Result<(i64, i64)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut width = DEFAULT_SLIDE_WIDTH_EMU;
    let mut height = DEFAULT_SLIDE_HEIGHT_EMU;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"p:sldSz" =>
            {
                width = attr_value(e, b"cx")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(width);
                height = attr_value(e, b"cy")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(height);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok((width, height))
}

/// `r:id` of every `element`, in document order
pub(crate) fn collect_rel_ids(xml: &[u8], element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == element => {
                if let Some(id) = attr_value(e, b"r:id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// `p:cSld/@name` of a layout
fn parse_layout_name(xml: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.name().as_ref() == b"p:cSld" =>
            {
                return Ok(attr_value(e, b"name"));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(PptxError::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide_contract::BLANK_LAYOUT_NAME;

    #[test]
    fn test_builtin_template_masters() {
        let template = PotxTemplate::builtin(&SlideContract::default()).unwrap();

        assert_eq!(template.masters().len(), 2);
        assert_eq!(template.slide_size, (9_144_000, 6_858_000));
        assert_eq!(
            template.layout_part(0, BLANK_LAYOUT_NAME).unwrap(),
            "ppt/slideLayouts/slideLayout1.xml"
        );
        assert_eq!(
            template.layout_part(1, BLANK_LAYOUT_NAME).unwrap(),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert!(template.sha256().is_none());
    }

    #[test]
    fn test_missing_layout_names_master() {
        let template = PotxTemplate::builtin(&SlideContract::default()).unwrap();

        let err = template.layout_part(1, "Title Only").unwrap_err();
        assert_eq!(err.code(), "PPTX004");
        assert_eq!(err.to_string(), "Layout 'Title Only' not found in master 1");

        assert!(template.layout_part(5, BLANK_LAYOUT_NAME).is_err());
    }

    #[test]
    fn test_from_bytes_records_digest() {
        let bytes = builtin_package(&SlideContract::default()).to_bytes().unwrap();
        let template = PotxTemplate::from_bytes(&bytes).unwrap();

        assert_eq!(template.sha256(), Some(sha256_hex(&bytes).as_str()));
        assert_eq!(template.sha256().unwrap().len(), 64);
    }

    #[test]
    fn test_verified_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house.pptx");
        let bytes = builtin_package(&SlideContract::default()).to_bytes().unwrap();
        std::fs::write(&path, &bytes).unwrap();

        let digest = sha256_hex(&bytes).to_uppercase();
        assert!(PotxTemplate::from_file_verified(&path, &digest).is_ok());

        let err = PotxTemplate::from_file_verified(&path, "00").unwrap_err();
        assert_eq!(err.code(), "PPTX005");
        assert!(err.to_string().starts_with("Template PPTX file hash mismatch. Expected 00, got "));
    }

    #[test]
    fn test_missing_file() {
        let err = PotxTemplate::from_file("/nonexistent/house.potx").unwrap_err();
        assert_eq!(err.code(), "PPTX001");
    }

    #[test]
    fn test_slide_size_parsing() {
        let xml = br#"<p:presentation xmlns:p="p"><p:sldSz cx="12192000" cy="6858000"/></p:presentation>"#;
        assert_eq!(extract_slide_size(xml).unwrap(), (12_192_000, 6_858_000));

        let xml = br#"<p:presentation xmlns:p="p"/>"#;
        assert_eq!(extract_slide_size(xml).unwrap(), (9_144_000, 6_858_000));
    }

    #[test]
    fn test_layout_name_is_unescaped() {
        let xml = br#"<p:sldLayout xmlns:p="p"><p:cSld name="Title &amp; Body"><p:spTree/></p:cSld></p:sldLayout>"#;
        assert_eq!(
            parse_layout_name(xml).unwrap().as_deref(),
            Some("Title & Body")
        );
    }
}
