//! `[Content_Types].xml` handling

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::escape_xml;

/// Content types namespace
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Part name of the content types stream
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

/// Parsed content types: extension defaults plus per-part overrides
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `[Content_Types].xml` stream
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if matches!(e.local_name().as_ref(), b"Default" | b"Override") =>
                {
                    let is_default = e.local_name().as_ref() == b"Default";
                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Extension" | b"PartName" => key = Some(value),
                            b"ContentType" => content_type = Some(value),
                            _ => {}
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            types.defaults.push((key.to_ascii_lowercase(), ct));
                        } else {
                            types.overrides.push((key, ct));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Register a default for a file extension if none exists
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        let ext = extension.to_ascii_lowercase();
        if !self.defaults.iter().any(|(e, _)| *e == ext) {
            self.defaults.push((ext, content_type.to_string()));
        }
    }

    /// Add or replace the override for a part (`part` without leading slash)
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let name = part_name(part);
        match self.overrides.iter_mut().find(|(p, _)| *p == name) {
            Some(entry) => entry.1 = content_type.to_string(),
            None => self.overrides.push((name, content_type.to_string())),
        }
    }

    /// Remove the override for a part; returns whether one existed
    pub fn remove_override(&mut self, part: &str) -> bool {
        let name = part_name(part);
        let before = self.overrides.len();
        self.overrides.retain(|(p, _)| *p != name);
        before != self.overrides.len()
    }

    /// Content type of a part, by override first and extension default second
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let name = part_name(part);
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| *p == name) {
            return Some(ct);
        }
        let ext = part.rsplit_once('.')?.1.to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Part names (without leading slash) that have an override
    pub fn override_parts(&self) -> impl Iterator<Item = &str> {
        self.overrides
            .iter()
            .map(|(p, _)| p.strip_prefix('/').unwrap_or(p))
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(part),
                escape_xml(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

fn part_name(part: &str) -> String {
    if part.starts_with('/') {
        part.to_string()
    } else {
        format!("/{}", part)
    }
}

/// MIME type for a media file extension
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "xml" => "application/xml",
        "rels" => "application/vnd.openxmlformats-package.relationships+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

    #[test]
    fn test_lookup_override_then_default() {
        let types = ContentTypes::parse(TYPES).unwrap();
        assert_eq!(types.content_type_of("ppt/slides/slide1.xml"), Some(CT_SLIDE));
        assert_eq!(
            types.content_type_of("ppt/theme/theme1.xml"),
            Some("application/xml")
        );
        assert_eq!(types.content_type_of("ppt/media/image1.png"), None);
    }

    #[test]
    fn test_set_and_remove_override() {
        let mut types = ContentTypes::parse(TYPES).unwrap();
        types.set_override("ppt/charts/chart1.xml", CT_CHART);
        types.ensure_default("PNG", "image/png");
        types.ensure_default("png", "image/x-other");

        assert_eq!(types.content_type_of("ppt/charts/chart1.xml"), Some(CT_CHART));
        assert_eq!(types.content_type_of("ppt/media/a.png"), Some("image/png"));

        assert!(types.remove_override("/ppt/slides/slide1.xml"));
        assert!(!types.remove_override("ppt/slides/slide1.xml"));

        let parts: Vec<&str> = types.override_parts().collect();
        assert_eq!(parts, vec!["ppt/charts/chart1.xml"]);
    }

    #[test]
    fn test_to_xml_reparses() {
        let mut types = ContentTypes::new();
        types.ensure_default("xml", "application/xml");
        types.set_override("ppt/slides/slide1.xml", CT_SLIDE);

        let reparsed = ContentTypes::parse(types.to_xml().as_bytes()).unwrap();
        assert_eq!(
            reparsed.content_type_of("ppt/slides/slide1.xml"),
            Some(CT_SLIDE)
        );
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("PNG"), "image/png");
        assert_eq!(content_type_for_extension("jpg"), "image/jpeg");
        assert_eq!(content_type_for_extension("xyz"), "application/octet-stream");
    }
}
