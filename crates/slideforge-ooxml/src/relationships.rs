//! Relationship parts (`_rels/*.rels`) for OPC packages
//!
//! Every part that points at another part (a slide at its layout, a slide at
//! a chart or image, the presentation at its slides) does so through a
//! relationship ID declared in the sibling `_rels/<part>.rels` file.
//!
//! # Example
//!
//! ```
//! use slideforge_ooxml::relationships::{rels_path_for, Relationships};
//!
//! let mut rels = Relationships::new();
//! let id = rels.add(Relationships::TYPE_IMAGE, "../media/image1.png");
//! assert_eq!(id, "rId1");
//! assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
//! ```

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::escape_xml;

/// OPC namespace for relationship parts
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Relationship type URIs used by presentation packages
impl Relationships {
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const TYPE_SLIDE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const TYPE_SLIDE_LAYOUT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const TYPE_SLIDE_MASTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const TYPE_NOTES_SLIDE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const TYPE_THEME: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const TYPE_CHART: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// One `<Relationship>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    /// `TargetMode="External"`; external targets are URLs, not parts
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type URI ends with the given short name
    /// (e.g. `"slideLayout"`)
    pub fn is_type(&self, short_name: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(short_name)
    }
}

/// Parsed relationships of a single source part, in document order
#[derive(Debug, Clone)]
pub struct Relationships {
    entries: Vec<Relationship>,
    /// Counter for generating unique IDs (starts at 1)
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id_counter: 1,
        }
    }
}

impl Relationships {
    /// Create an empty relationship set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = String::new();
                    let mut external = false;

                    for attr in e.attributes().filter_map(|a| a.ok()) {
                        let value = attr.unescape_value()?.into_owned();
                        match attr.key.as_ref() {
                            b"Id" => id = Some(value),
                            b"Target" => target = Some(value),
                            b"Type" => rel_type = value,
                            b"TargetMode" => external = value == "External",
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target)) = (id, target) {
                        if let Some(num) = extract_id_number(&id) {
                            rels.next_id_counter = rels.next_id_counter.max(num + 1);
                        }
                        rels.entries.push(Relationship {
                            id,
                            rel_type,
                            target,
                            external,
                        });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Add an internal relationship and return the generated ID
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        self.push(rel_type, target, false)
    }

    /// Add an external (URL) relationship and return the generated ID
    pub fn add_external(&mut self, rel_type: &str, target: &str) -> String {
        self.push(rel_type, target, true)
    }

    fn push(&mut self, rel_type: &str, target: &str, external: bool) -> String {
        let id = self.peek_next_id();
        self.next_id_counter += 1;
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external,
        });
        id
    }

    /// Append a relationship under its existing ID
    pub fn push_with_id(&mut self, rel: Relationship) {
        if let Some(num) = extract_id_number(&rel.id) {
            self.next_id_counter = self.next_id_counter.max(num + 1);
        }
        self.entries.push(rel);
    }

    /// Remove a relationship by ID
    pub fn remove(&mut self, id: &str) -> Option<Relationship> {
        let pos = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Serialize to a `.rels` part
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                escape_xml(&rel.id),
                escape_xml(&rel.rel_type),
                escape_xml(&rel.target)
            ));
            if rel.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }

    /// Look up a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First relationship of the given short type name
    pub fn find_by_type(&self, short_name: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.is_type(short_name))
    }

    /// Iterate over relationships in document order
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ID the next `add` call will return
    pub fn peek_next_id(&self) -> String {
        format!("rId{}", self.next_id_counter)
    }
}

/// Path of the relationship part that belongs to `part`.
///
/// The package root (empty string) maps to `_rels/.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target relative to the part that declares it.
///
/// Absolute targets (`/ppt/slides/slide1.xml`) are taken from the package
/// root. `..` segments are collapsed.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = source_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Path of `target_part` written relative to the directory of `source_part`
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();

    let common = source_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..")
        .take(source_dir.len() - common)
        .collect();
    parts.extend(&target[common..]);
    parts.join("/")
}

/// Extract the numeric portion from a relationship ID (e.g., "rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE_RELS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout7.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide" Target="../notesSlides/notesSlide1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_slide_relationships() {
        let rels = Relationships::parse(SLIDE_RELS).unwrap();

        assert_eq!(rels.len(), 3);
        let layout = rels.find_by_type("slideLayout").unwrap();
        assert_eq!(layout.id, "rId1");
        assert_eq!(layout.target, "../slideLayouts/slideLayout7.xml");

        let link = rels.get("rId2").unwrap();
        assert!(link.external);
        assert_eq!(link.target, "https://example.com/?a=1&b=2");
    }

    #[test]
    fn test_add_continues_after_highest_id() {
        let mut rels = Relationships::parse(SLIDE_RELS).unwrap();
        let id = rels.add(Relationships::TYPE_CHART, "../charts/chart3.xml");
        assert_eq!(id, "rId5");
        assert_eq!(rels.peek_next_id(), "rId6");
    }

    #[test]
    fn test_remove() {
        let mut rels = Relationships::parse(SLIDE_RELS).unwrap();
        let removed = rels.remove("rId4").unwrap();
        assert!(removed.is_type("notesSlide"));
        assert!(rels.find_by_type("notesSlide").is_none());
        assert!(rels.remove("rId99").is_none());
    }

    #[test]
    fn test_to_xml_reparses() {
        let mut rels = Relationships::new();
        rels.add(Relationships::TYPE_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        rels.add_external(Relationships::TYPE_HYPERLINK, "https://example.com/?q=<x>&y");

        let xml = rels.to_xml();
        assert!(xml.contains(r#"TargetMode="External""#));
        assert!(xml.contains("&lt;x&gt;&amp;y"));

        let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
        let ids: Vec<&str> = reparsed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rId1", "rId2"]);
        assert_eq!(
            reparsed.get("rId2").unwrap().target,
            "https://example.com/?q=<x>&y"
        );
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            rels_path_for("ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            rels_path_for("ppt/slides/slide12.xml"),
            "ppt/slides/_rels/slide12.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout1.xml"),
            "ppt/slideLayouts/slideLayout1.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "/ppt/media/image1.png"),
            "ppt/media/image1.png"
        );
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/charts/chart1.xml"),
            "../charts/chart1.xml"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide2.xml"),
            "slides/slide2.xml"
        );
    }

    #[test]
    fn test_extract_id_number() {
        assert_eq!(extract_id_number("rId1"), Some(1));
        assert_eq!(extract_id_number("rId123"), Some(123));
        assert_eq!(extract_id_number("RId5"), Some(5));
        assert_eq!(extract_id_number("invalid"), None);
    }
}
