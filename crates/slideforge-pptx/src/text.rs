//! Styled text: inline color markup, script splitting and DrawingML runs.
//!
//! Text handed to the slide builders goes through three steps:
//!
//! 1. `->` becomes the Wingdings right-arrow glyph ([`ARROW_CHAR`])
//! 2. `[color]...[/color]` spans are split off with their color
//! 3. each span is cut into ASCII and non-ASCII chunks, one run per chunk,
//!    so Latin text and East-Asian text get their own font and weight

use std::sync::OnceLock;

use regex::Regex;
use slideforge_ooxml::xml::escape_xml;

use crate::color::{Palette, Rgb};

/// Literal that is rewritten to [`ARROW_CHAR`]
pub const ARROW_TOKEN: &str = "->";

/// Wingdings right arrow (private use area)
pub const ARROW_CHAR: char = '\u{f0e0}';

/// A span of text with an optional color override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub color: Option<Rgb>,
}

impl StyledSegment {
    fn new(text: &str, color: Option<Rgb>) -> Self {
        Self {
            text: text.to_string(),
            color,
        }
    }
}

fn open_tag_regex() -> &'static Regex {
    static OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    OPEN_TAG.get_or_init(|| Regex::new(r"\[(#[0-9A-Fa-f]{6}|\w+)\]").unwrap())
}

/// Split `[token]body[/token]` markup into colored segments.
///
/// The body is the shortest text up to the matching close tag and cannot
/// span a line break. Tokens that do not resolve to a color stay in the
/// text literally, tags included. Text without any valid tag comes back as
/// a single uncolored segment.
pub fn parse_inline_markup(text: &str, palette: &Palette) -> Vec<StyledSegment> {
    let re = open_tag_regex();
    let mut segments = Vec::new();
    let mut last_end = 0;
    let mut search_from = 0;

    while let Some(caps) = re.captures_at(text, search_from) {
        let (Some(open), Some(token)) = (caps.get(0), caps.get(1)) else {
            break;
        };

        let close = format!("[/{}]", token.as_str());
        let rest = &text[open.end()..];
        let line = rest.find('\n').map_or(rest, |nl| &rest[..nl]);
        let Some(body_len) = line.find(&close) else {
            // no close tag: retry one character later, as a regex engine would
            search_from = next_char_boundary(text, open.start());
            continue;
        };
        let body = &rest[..body_len];
        let end = open.end() + body_len + close.len();

        match palette.resolve_token(token.as_str()) {
            Some(color) => {
                if open.start() > last_end {
                    segments.push(StyledSegment::new(&text[last_end..open.start()], None));
                }
                segments.push(StyledSegment::new(body, Some(color)));
                last_end = end;
            }
            None => {
                // unknown color: keep the whole match as literal text
            }
        }
        search_from = end;
    }

    if last_end < text.len() {
        segments.push(StyledSegment::new(&text[last_end..], None));
    }
    if segments.is_empty() {
        segments.push(StyledSegment::new(text, None));
    }
    segments
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map_or(text.len(), |c| index + c.len_utf8())
}

/// Whether a character is ASCII (the Latin font covers it)
pub fn is_ascii_char(ch: char) -> bool {
    (ch as u32) < 128
}

/// Cut text into `(chunk, is_ascii)` pieces.
///
/// Whitespace after the first character always joins the chunk before it,
/// so run boundaries never fall on a space.
pub fn split_by_script(text: &str) -> Vec<(String, bool)> {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return Vec::new();
    };

    let mut chunks = Vec::new();
    let mut current = String::from(first);
    let mut ascii = is_ascii_char(first);

    for ch in chars {
        if ch.is_whitespace() {
            current.push(ch);
            continue;
        }
        let a = is_ascii_char(ch);
        if a == ascii {
            current.push(ch);
        } else {
            chunks.push((std::mem::take(&mut current), ascii));
            current.push(ch);
            ascii = a;
        }
    }
    chunks.push((current, ascii));
    chunks
}

/// Replace every `->` with the arrow glyph
pub fn substitute_arrows(text: &str) -> String {
    text.replace(ARROW_TOKEN, &ARROW_CHAR.to_string())
}

/// How a piece of text is turned into runs
#[derive(Debug, Clone, PartialEq)]
pub struct RunStyle {
    /// Hundredths of a point
    pub size: u32,
    /// `None` inherits the color from the shape or table style
    pub color: Option<Rgb>,
    pub latin_font: String,
    pub ea_font: String,
    pub symbol_font: String,
    pub ascii_bold: bool,
    pub unicode_bold: bool,
    pub lang: String,
}

/// A single `a:r`
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub size: u32,
    pub bold: bool,
    pub color: Option<Rgb>,
    pub latin_font: String,
    pub ea_font: String,
    /// Typeface for `a:sym`, set on runs that contain the arrow glyph
    pub symbol_font: Option<String>,
    pub lang: String,
}

impl TextRun {
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<a:r><a:rPr lang="{}" altLang="en-US" sz="{}" b="{}" dirty="0">"#,
            escape_xml(&self.lang),
            self.size,
            if self.bold { 1 } else { 0 }
        );
        if let Some(color) = self.color {
            xml.push_str(&format!(
                r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
                color.hex()
            ));
        }
        xml.push_str(&format!(
            r#"<a:latin typeface="{}"/><a:ea typeface="{}"/>"#,
            escape_xml(&self.latin_font),
            escape_xml(&self.ea_font)
        ));
        if let Some(sym) = &self.symbol_font {
            xml.push_str(&format!(
                r#"<a:sym typeface="{}" pitchFamily="2" charset="2"/>"#,
                escape_xml(sym)
            ));
        }
        xml.push_str(&format!("</a:rPr><a:t>{}</a:t></a:r>", escape_xml(&self.text)));
        xml
    }
}

/// Build the runs for one piece of text
pub fn build_runs(text: &str, style: &RunStyle, palette: &Palette) -> Vec<TextRun> {
    let text = substitute_arrows(text);
    let mut runs = Vec::new();

    for segment in parse_inline_markup(&text, palette) {
        let color = segment.color.or(style.color);
        for (chunk, ascii) in split_by_script(&segment.text) {
            let symbol_font = chunk
                .contains(ARROW_CHAR)
                .then(|| style.symbol_font.clone());
            runs.push(TextRun {
                latin_font: if ascii {
                    style.latin_font.clone()
                } else {
                    style.ea_font.clone()
                },
                bold: if ascii {
                    style.ascii_bold
                } else {
                    style.unicode_bold
                },
                size: style.size,
                color,
                ea_font: style.ea_font.clone(),
                symbol_font,
                lang: style.lang.clone(),
                text: chunk,
            });
        }
    }
    runs
}

/// Horizontal paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn xml_value(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
        }
    }
}

/// Bullet marker of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum BulletMarker {
    /// `a:buNone`
    Suppressed,
    /// `a:buFont` + `a:buChar`
    Char {
        char: String,
        font: String,
        pitch_family: String,
        charset: String,
    },
    /// `a:buAutoNum`
    AutoNumber(String),
}

/// `a:pPr` attributes and children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphProps {
    pub margin_left: Option<i64>,
    pub margin_right: Option<i64>,
    pub indent: Option<i64>,
    pub align: Option<Align>,
    pub ea_line_break: bool,
    pub latin_line_break: bool,
    pub hanging_punct: bool,
    pub font_align_base: bool,
    /// Thousandths of a percent
    pub line_spacing: Option<u32>,
    pub space_before: Option<u32>,
    pub space_after: Option<u32>,
    pub bullet: Option<BulletMarker>,
}

impl ParagraphProps {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn to_xml(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut attrs = String::new();
        let mut push = |name: &str, value: String| {
            attrs.push_str(&format!(r#" {}="{}""#, name, value));
        };
        if let Some(v) = self.margin_left {
            push("marL", v.to_string());
        }
        if let Some(v) = self.margin_right {
            push("marR", v.to_string());
        }
        if let Some(v) = self.indent {
            push("indent", v.to_string());
        }
        if let Some(a) = self.align {
            push("algn", a.xml_value().to_string());
        }
        if self.ea_line_break {
            push("eaLnBrk", "1".to_string());
        }
        if self.font_align_base {
            push("fontAlgn", "base".to_string());
        }
        if self.latin_line_break {
            push("latinLnBrk", "1".to_string());
        }
        if self.hanging_punct {
            push("hangingPunct", "1".to_string());
        }

        let mut children = String::new();
        if let Some(v) = self.line_spacing {
            children.push_str(&format!(r#"<a:lnSpc><a:spcPct val="{}"/></a:lnSpc>"#, v));
        }
        if let Some(v) = self.space_before {
            children.push_str(&format!(r#"<a:spcBef><a:spcPct val="{}"/></a:spcBef>"#, v));
        }
        if let Some(v) = self.space_after {
            children.push_str(&format!(r#"<a:spcAft><a:spcPct val="{}"/></a:spcAft>"#, v));
        }
        match &self.bullet {
            Some(BulletMarker::Suppressed) => children.push_str("<a:buNone/>"),
            Some(BulletMarker::Char {
                char,
                font,
                pitch_family,
                charset,
            }) => children.push_str(&format!(
                r#"<a:buFont typeface="{}" pitchFamily="{}" charset="{}"/><a:buChar char="{}"/>"#,
                escape_xml(font),
                escape_xml(pitch_family),
                escape_xml(charset),
                escape_xml(char)
            )),
            Some(BulletMarker::AutoNumber(kind)) => {
                children.push_str(&format!(r#"<a:buAutoNum type="{}"/>"#, escape_xml(kind)))
            }
            None => {}
        }

        if children.is_empty() {
            format!("<a:pPr{}/>", attrs)
        } else {
            format!("<a:pPr{}>{}</a:pPr>", attrs, children)
        }
    }
}

/// Inline content of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(TextRun),
    /// Soft line break; size in hundredths of a point
    Break { lang: String, size: u32 },
}

/// A single `a:p`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub props: ParagraphProps,
    pub content: Vec<Inline>,
}

impl Paragraph {
    /// True for a freshly created paragraph with nothing set on it
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.props.is_empty()
    }

    pub fn push_runs(&mut self, runs: impl IntoIterator<Item = TextRun>) {
        self.content.extend(runs.into_iter().map(Inline::Run));
    }

    /// Concatenated run text
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|item| match item {
                Inline::Run(run) => run.text.as_str(),
                Inline::Break { .. } => "\n",
            })
            .collect()
    }

    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.content.iter().filter_map(|item| match item {
            Inline::Run(run) => Some(run),
            Inline::Break { .. } => None,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<a:p>");
        xml.push_str(&self.props.to_xml());
        for item in &self.content {
            match item {
                Inline::Run(run) => xml.push_str(&run.to_xml()),
                Inline::Break { lang, size } => xml.push_str(&format!(
                    r#"<a:br><a:rPr lang="{}" sz="{}"/></a:br>"#,
                    escape_xml(lang),
                    size
                )),
            }
        }
        xml.push_str("</a:p>");
        xml
    }
}

/// Text wrapping of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    None,
    Square,
}

/// `a:bodyPr`
#[derive(Debug, Clone, PartialEq)]
pub struct BodyProps {
    pub wrap: Wrap,
    pub auto_fit: bool,
    /// `a:bodyPr/@anchor` (`t`, `ctr`, `b`)
    pub anchor: Option<&'static str>,
}

impl Default for BodyProps {
    fn default() -> Self {
        Self {
            wrap: Wrap::None,
            auto_fit: true,
            anchor: None,
        }
    }
}

impl BodyProps {
    fn to_xml(&self) -> String {
        let wrap = match self.wrap {
            Wrap::None => "none",
            Wrap::Square => "square",
        };
        let anchor = self
            .anchor
            .map(|a| format!(r#" anchor="{}""#, a))
            .unwrap_or_default();
        if self.auto_fit {
            format!(r#"<a:bodyPr wrap="{}" rtlCol="0"{}><a:spAutoFit/></a:bodyPr>"#, wrap, anchor)
        } else {
            format!(r#"<a:bodyPr wrap="{}" rtlCol="0"{}/>"#, wrap, anchor)
        }
    }
}

/// Text body of a shape (`p:txBody`) or table cell (`a:txBody`)
#[derive(Debug, Clone, PartialEq)]
pub struct TextBody {
    pub body: BodyProps,
    pub paragraphs: Vec<Paragraph>,
}

impl Default for TextBody {
    fn default() -> Self {
        Self {
            body: BodyProps::default(),
            paragraphs: vec![Paragraph::default()],
        }
    }
}

impl TextBody {
    pub fn new(body: BodyProps) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// Reuse the untouched first paragraph, otherwise append one
    pub fn next_paragraph(&mut self) -> &mut Paragraph {
        let reuse = self.paragraphs.len() == 1 && self.paragraphs[0].is_blank();
        if !reuse {
            self.paragraphs.push(Paragraph::default());
        }
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Paragraph text joined with newlines
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serialize with the given element name (`p:txBody` or `a:txBody`)
    pub fn to_xml(&self, element: &str) -> String {
        let mut xml = format!("<{}>{}<a:lstStyle/>", element, self.body.to_xml());
        for p in &self.paragraphs {
            xml.push_str(&p.to_xml());
        }
        xml.push_str(&format!("</{}>", element));
        xml
    }
}
