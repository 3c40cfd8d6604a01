//! Whitespace preservation on text-run elements
//!
//! Consumers collapse leading and trailing whitespace in `*:t` elements
//! unless the element carries `xml:space="preserve"`. [`repair_part`] adds
//! the marker where it is missing; running it twice changes nothing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use slideforge_ooxml::xml::is_text_element;

use crate::error::{Result, ValidateError};

/// Namespace of the `xml:` prefix
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Message of the finding [`repair_part`] fixes
pub fn unpreserved_message(element: &str) -> String {
    format!(
        "text in '{}' has leading or trailing whitespace without xml:space=\"preserve\"",
        element
    )
}

/// Whether decoded element text needs the preserve marker
pub fn needs_preserve(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_whitespace())
        || text.ends_with(|c: char| c.is_ascii_whitespace())
}

fn has_space_attribute(start: &BytesStart) -> bool {
    start
        .attributes()
        .flatten()
        .any(|a| a.key.as_ref() == b"xml:space")
}

/// A text-run start tag held back until its leading text is known
struct Pending {
    start: BytesStart<'static>,
    events: Vec<Event<'static>>,
    text: String,
}

/// Add `xml:space="preserve"` to every `*:t` element whose text needs it.
///
/// The element's leading text is decoded (character references, CDATA)
/// before the check, so repair and validation agree on what needs the
/// marker. Returns the rewritten part and the number of elements changed;
/// the bytes are unchanged when nothing needed repair.
pub fn repair_part(xml: &[u8], part: &str) -> Result<(Vec<u8>, usize)> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 64));

    let mut pending: Option<Pending> = None;
    let mut repaired = 0;
    let mut buf = Vec::new();
    let fail = |source: quick_xml::Error| ValidateError::Repair {
        path: part.to_string(),
        source,
    };

    loop {
        buf.clear();
        let event = reader.read_event_into(&mut buf).map_err(fail)?;
        if let Some(current) = pending.as_mut() {
            let decoded = match &event {
                Event::Text(t) => Some(t.unescape().map_err(fail)?),
                Event::CData(c) => Some(c.decode().map_err(|e| fail(e.into()))?),
                _ => None,
            };
            if let Some(text) = decoded {
                current.text.push_str(&text);
                current.events.push(event.into_owned());
                continue;
            }
        }
        if let Some(Pending { mut start, events, text }) = pending.take() {
            if needs_preserve(&text) {
                start.push_attribute(("xml:space", "preserve"));
                repaired += 1;
            }
            writer.write_event(Event::Start(start)).map_err(|e| fail(e.into()))?;
            for held in events {
                writer.write_event(held).map_err(|e| fail(e.into()))?;
            }
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if is_text_element(e.name().as_ref()) && !has_space_attribute(&e) => {
                pending = Some(Pending {
                    start: e.into_owned(),
                    events: Vec::new(),
                    text: String::new(),
                });
            }
            other => writer.write_event(other).map_err(|e| fail(e.into()))?,
        }
    }

    if repaired == 0 {
        return Ok((xml.to_vec(), 0));
    }
    Ok((writer.into_inner(), repaired))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><a:p><a:r><a:t> lead</a:t></a:r><a:r><a:t>trail </a:t></a:r><a:r><a:t>none</a:t></a:r><a:r><a:t xml:space="preserve"> kept </a:t></a:r><a:r><a:t/></a:r></a:p></p:cSld></p:sld>"#;

    #[test]
    fn test_repair_marks_only_whitespace_edges() {
        let (out, count) = repair_part(SLIDE.as_bytes(), "slide1.xml").unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(count, 2);
        assert!(out.contains(r#"<a:t xml:space="preserve"> lead</a:t>"#));
        assert!(out.contains(r#"<a:t xml:space="preserve">trail </a:t>"#));
        assert!(out.contains("<a:t>none</a:t>"));
        assert!(out.contains(r#"<a:t xml:space="preserve"> kept </a:t>"#));
        assert!(out.contains("<a:t/>"));
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
    }

    #[test]
    fn test_repair_is_idempotent() {
        let (once, first) = repair_part(SLIDE.as_bytes(), "slide1.xml").unwrap();
        let (twice, second) = repair_part(&once, "slide1.xml").unwrap();
        assert_eq!(first, 2);
        assert_eq!(second, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_part_is_returned_untouched() {
        let xml = b"<a:p xmlns:a=\"urn:a\">\n  <a:r><a:t>x</a:t></a:r>\n</a:p>";
        let (out, count) = repair_part(xml, "p.xml").unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, xml.to_vec());
    }

    #[test]
    fn test_malformed_part_names_the_file() {
        let err = repair_part(b"<a:t> x</b:t>", "ppt/slides/slide9.xml").unwrap_err();
        assert!(err.to_string().contains("ppt/slides/slide9.xml"));
    }

    #[test]
    fn test_needs_preserve() {
        assert!(needs_preserve(" a"));
        assert!(needs_preserve("a\t"));
        assert!(needs_preserve("\n"));
        assert!(!needs_preserve("a b"));
        assert!(!needs_preserve(""));
    }

    #[test]
    fn test_repair_decodes_character_references() {
        let xml = br#"<a:p xmlns:a="urn:a"><a:r><a:t>&#32;x</a:t></a:r><a:r><a:t>y&#9;</a:t></a:r><a:r><a:t>&#xA;</a:t></a:r><a:r><a:t>y&amp; z</a:t></a:r><a:r><a:t><![CDATA[ c]]></a:t></a:r></a:p>"#;
        let (out, count) = repair_part(xml, "p.xml").unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(count, 4);
        assert!(out.contains(r#"<a:t xml:space="preserve">&#32;x</a:t>"#));
        assert!(out.contains(r#"<a:t xml:space="preserve">&#xA;</a:t>"#));
        assert!(out.contains("<a:t>y&amp; z</a:t>"));
        assert!(out.contains(r#"<a:t xml:space="preserve"><![CDATA[ c]]></a:t>"#));
    }
}
