//! XML normalization for package parts
//!
//! Parts are stored condensed (no formatting whitespace, no comments) and
//! unpacked pretty-printed for diff-friendly editing. Both directions keep
//! the content of text-run elements (`a:t`, `w:t`, ...) byte for byte.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{OoxmlError, Result};

/// Smart quotes rewritten to numeric character references on unpack
pub const SMART_QUOTE_REPLACEMENTS: [(char, &str); 4] = [
    ('\u{201C}', "&#x201C;"),
    ('\u{201D}', "&#x201D;"),
    ('\u{2018}', "&#x2018;"),
    ('\u{2019}', "&#x2019;"),
];

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Whether a qualified element name is a text-run element (`*:t`)
pub fn is_text_element(qname: &[u8]) -> bool {
    qname.ends_with(b":t") || qname == b"t"
}

/// Strip whitespace-only text nodes and comments outside text-run elements.
///
/// `part` names the file in the returned error; a part that cannot be
/// parsed is an error rather than being passed through.
pub fn condense(xml: &[u8], part: &str) -> Result<Vec<u8>> {
    rewrite(xml, part, Writer::new(Vec::new()))
}

/// Re-indent a part with two spaces per level
pub fn pretty_print(xml: &[u8], part: &str) -> Result<Vec<u8>> {
    rewrite(xml, part, Writer::new_with_indent(Vec::new(), b' ', 2))
}

/// Rewrite the four typographic quote characters as numeric references
pub fn escape_smart_quotes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for ch in content.chars() {
        match SMART_QUOTE_REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// A text-run element being copied verbatim
struct TextRun {
    start: BytesStart<'static>,
    inner: Writer<Vec<u8>>,
    depth: usize,
}

fn rewrite(xml: &[u8], part: &str, mut writer: Writer<Vec<u8>>) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    // Text runs bypass the indenting writer: their content is copied
    // unformatted and an empty run is written as an empty element.
    let mut run: Option<TextRun> = None;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| OoxmlError::malformed(part, e))?;

        if let Some(current) = run.as_mut() {
            match &event {
                Event::Eof => {
                    return Err(OoxmlError::InvalidStructure(format!(
                        "{}: text element is not closed",
                        part
                    )))
                }
                Event::Start(_) => current.depth += 1,
                Event::End(_) if current.depth == 0 => {
                    if let Some(done) = run.take() {
                        write_text_run(&mut writer, done)?;
                    }
                    continue;
                }
                Event::End(_) => current.depth -= 1,
                _ => {}
            }
            current.inner.write_event(event)?;
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(e) if is_text_element(e.name().as_ref()) => {
                run = Some(TextRun {
                    start: e.into_owned(),
                    inner: Writer::new(Vec::new()),
                    depth: 0,
                });
            }
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
            Event::Comment(_) => {}
            other => writer.write_event(other)?,
        }
    }

    Ok(writer.into_inner())
}

fn write_text_run(writer: &mut Writer<Vec<u8>>, run: TextRun) -> Result<()> {
    let inner = run.inner.into_inner();
    if inner.is_empty() {
        writer.write_event(Event::Empty(run.start))?;
        return Ok(());
    }
    let end = run.start.to_end().into_owned();
    writer.write_event(Event::Start(run.start))?;
    writer.get_mut().extend_from_slice(&inner);
    // an empty text event keeps the closing tag on the same line
    writer.write_event(Event::Text(BytesText::from_escaped("")))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}
