//! SlideContract: the house style as configuration.
//!
//! Every number the slide builders use (box geometry, font sizes, bullet
//! glyphs, palette, caption and visual-area metrics) comes from a
//! `SlideContract`. The defaults reproduce the built-in house style; a TOML
//! file can override any section.
//!
//! Lengths are EMU (914400 per inch); font sizes are hundredths of a point,
//! the unit of `a:rPr/@sz`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::error::{PptxError, Result};

/// Latin font used for ASCII runs
pub const FONT_ASCII: &str = "Arial";

/// East-Asian font used for everything else
pub const FONT_EA: &str = "HY\u{acac}\u{ace0}\u{b515}";

/// Name of the blank layout looked up in each master
pub const BLANK_LAYOUT_NAME: &str = "\u{be48} \u{d654}\u{ba74}";

/// SlideContract configuration for deck generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideContract {
    /// Metadata about the contract
    #[serde(default)]
    pub meta: ContractMeta,

    /// Run fonts
    #[serde(default)]
    pub fonts: FontConfig,

    /// Which template masters carry cover and content slides
    #[serde(default)]
    pub masters: MasterConfig,

    /// Content-slide title box
    #[serde(default = "default_title_box")]
    pub title: BoxStyle,

    /// Content-slide body text box
    #[serde(default = "default_content_box")]
    pub content: BoxStyle,

    /// Cover-slide title box
    #[serde(default = "default_cover_title_box")]
    pub cover_title: BoxStyle,

    /// Cover-slide date/presenter box
    #[serde(default = "default_cover_info_box")]
    pub cover_info: BoxStyle,

    /// Paragraph metrics for sections and bullets
    #[serde(default)]
    pub text: TextConfig,

    /// Bullet glyphs and per-level defaults
    #[serde(default)]
    pub bullets: BulletConfig,

    /// Named colors, `name = "RRGGBB"`
    #[serde(default = "default_palette")]
    pub palette: BTreeMap<String, String>,

    /// Captions under visual elements
    #[serde(default)]
    pub caption: CaptionConfig,

    /// Visual-area placement below the content box
    #[serde(default)]
    pub visual: VisualConfig,

    /// Table sizing
    #[serde(default)]
    pub table: TableConfig,

    /// Chart text
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Contract metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractMeta {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Language tag written on every run (`a:rPr/@lang`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Contract version
    #[serde(default = "default_version")]
    pub version: String,

    /// Description
    #[serde(default)]
    pub description: String,
}

fn default_locale() -> String {
    "ko-KR".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Fonts applied to runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_latin_font")]
    pub latin: String,

    #[serde(default = "default_ea_font")]
    pub east_asian: String,

    /// Typeface of the arrow glyph (`a:sym`)
    #[serde(default = "default_symbol_font")]
    pub symbol: String,
}

fn default_latin_font() -> String {
    FONT_ASCII.to_string()
}
fn default_ea_font() -> String {
    FONT_EA.to_string()
}
fn default_symbol_font() -> String {
    "Wingdings".to_string()
}

/// Master selection (0-based, in `p:sldMasterIdLst` order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    #[serde(default)]
    pub cover: usize,

    #[serde(default = "default_content_master")]
    pub content: usize,

    /// Layout name (`p:cSld/@name`) used for new slides
    #[serde(default = "default_blank_layout")]
    pub blank_layout: String,
}

fn default_content_master() -> usize {
    1
}
fn default_blank_layout() -> String {
    BLANK_LAYOUT_NAME.to_string()
}

/// Geometry and text style of a fixed text box.
///
/// A box section in TOML replaces the whole box, so the four coordinates
/// must be given together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,

    #[serde(default)]
    pub font_size: Option<u32>,

    #[serde(default)]
    pub color: Option<String>,
}

fn default_title_box() -> BoxStyle {
    BoxStyle {
        left: 179_512,
        top: 154_732,
        width: 8_352_928,
        height: 461_665,
        font_size: Some(2400),
        color: Some("072A5E".to_string()),
    }
}

fn default_content_box() -> BoxStyle {
    BoxStyle {
        left: 166_261,
        top: 724_090,
        width: 8_870_234,
        height: 3_599_447,
        font_size: None,
        color: None,
    }
}

fn default_cover_title_box() -> BoxStyle {
    BoxStyle {
        left: 561_257,
        top: 2_636_912,
        width: 8_010_140,
        height: 1_186_800,
        font_size: Some(2000),
        color: Some("002060".to_string()),
    }
}

fn default_cover_info_box() -> BoxStyle {
    BoxStyle {
        left: 3_242_805,
        top: 5_229_200,
        width: 5_328_592,
        height: 696_857,
        font_size: Some(1400),
        color: Some("002060".to_string()),
    }
}

/// Section and bullet paragraph metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Line spacing in thousandths of a percent (130000 = 130%)
    #[serde(default = "default_line_spacing")]
    pub line_spacing: u32,

    #[serde(default = "default_section_size")]
    pub section_size: u32,

    #[serde(default = "default_body_color")]
    pub section_color: String,

    /// Prepended to every section heading
    #[serde(default = "default_section_prefix")]
    pub section_prefix: String,

    /// Left margin of level-0 bullets
    #[serde(default = "default_margin_base")]
    pub margin_base: i64,

    /// Extra left margin per nesting level
    #[serde(default = "default_margin_step")]
    pub margin_step: i64,

    /// Level-0 bullets
    #[serde(default = "default_first_level")]
    pub first_level: LevelStyle,

    /// Bullets at level 1 and deeper
    #[serde(default = "default_nested_level")]
    pub nested_level: LevelStyle,
}

fn default_line_spacing() -> u32 {
    130_000
}
fn default_section_size() -> u32 {
    1800
}
fn default_body_color() -> String {
    "404040".to_string()
}
fn default_section_prefix() -> String {
    "\u{258c}".to_string()
}
fn default_margin_base() -> i64 {
    266_700
}
fn default_margin_step() -> i64 {
    182_563
}

/// Hanging indent, size and color of one bullet level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStyle {
    pub indent: i64,
    pub font_size: u32,
    #[serde(default = "default_body_color")]
    pub color: String,
}

fn default_first_level() -> LevelStyle {
    LevelStyle {
        indent: -174_625,
        font_size: 1400,
        color: default_body_color(),
    }
}

fn default_nested_level() -> LevelStyle {
    LevelStyle {
        indent: -182_563,
        font_size: 1200,
        color: default_body_color(),
    }
}

/// A character bullet: glyph plus the font that renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletGlyph {
    pub char: String,
    pub font: String,
    pub pitch_family: String,
    pub charset: String,
}

impl BulletGlyph {
    fn new(char: &str, font: &str, pitch_family: &str, charset: &str) -> Self {
        Self {
            char: char.to_string(),
            font: font.to_string(),
            pitch_family: pitch_family.to_string(),
            charset: charset.to_string(),
        }
    }
}

/// Bullet styles and the default style per level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletConfig {
    /// Default style name for level 0, 1, ...; deeper levels use the last
    #[serde(default = "default_level_bullets")]
    pub defaults: Vec<String>,

    /// Character bullet styles. `number` and `none` are always available.
    #[serde(default = "default_bullet_styles")]
    pub styles: BTreeMap<String, BulletGlyph>,

    /// `a:buAutoNum/@type` used by the `number` style
    #[serde(default = "default_auto_number")]
    pub auto_number: String,
}

fn default_level_bullets() -> Vec<String> {
    ["dash", "arrow", "square", "circle", "check"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_bullet_styles() -> BTreeMap<String, BulletGlyph> {
    let mut styles = BTreeMap::new();
    styles.insert("dash".to_string(), BulletGlyph::new("-", FONT_EA, "18", "-127"));
    styles.insert("arrow".to_string(), BulletGlyph::new("\u{d8}", "Wingdings", "2", "2"));
    styles.insert("square".to_string(), BulletGlyph::new("n", "Wingdings", "2", "2"));
    styles.insert("circle".to_string(), BulletGlyph::new("l", "Wingdings", "2", "2"));
    styles.insert("check".to_string(), BulletGlyph::new("\u{fc}", "Wingdings", "2", "2"));
    styles
}

fn default_auto_number() -> String {
    "arabicPeriod".to_string()
}

fn default_palette() -> BTreeMap<String, String> {
    crate::color::DEFAULT_PALETTE
        .iter()
        .map(|(name, rgb)| (name.to_string(), rgb.hex()))
        .collect()
}

/// Caption text boxes under visual elements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionConfig {
    /// 10.5 pt
    #[serde(default = "default_caption_size")]
    pub font_size: u32,

    #[serde(default = "default_caption_color")]
    pub color: String,

    /// Space between an element's bottom edge and its caption
    #[serde(default = "default_caption_gap")]
    pub gap: i64,

    #[serde(default = "default_caption_box_height")]
    pub box_height: i64,
}

fn default_caption_size() -> u32 {
    1050
}
fn default_caption_color() -> String {
    "000000".to_string()
}
fn default_caption_gap() -> i64 {
    50_000
}
fn default_caption_box_height() -> i64 {
    240_000
}

impl CaptionConfig {
    /// Height withheld from an element that carries a caption
    pub fn reserve(&self) -> i64 {
        self.gap + self.box_height
    }
}

/// Default bounds of a visual area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualConfig {
    /// Distance below the content box
    #[serde(default = "default_visual_top_gap")]
    pub top_gap: i64,

    /// Distance kept free above the slide's bottom edge
    #[serde(default = "default_visual_bottom_margin")]
    pub bottom_margin: i64,

    /// Horizontal gap between elements
    #[serde(default = "default_visual_gap")]
    pub gap: i64,
}

fn default_visual_top_gap() -> i64 {
    100_000
}
fn default_visual_bottom_margin() -> i64 {
    350_000
}
fn default_visual_gap() -> i64 {
    150_000
}

/// Table row sizing and text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Height of a single-line row
    #[serde(default = "default_row_height")]
    pub row_height: i64,

    /// Height added per extra line in a cell
    #[serde(default = "default_line_height")]
    pub line_height: i64,

    #[serde(default = "default_header_size")]
    pub header_size: u32,

    #[serde(default = "default_table_body_size")]
    pub body_size: u32,

    /// Built-in table style GUID (`a:tableStyleId`)
    #[serde(default = "default_table_style")]
    pub style_id: String,
}

fn default_row_height() -> i64 {
    320_040
}
fn default_line_height() -> i64 {
    182_880
}
fn default_header_size() -> u32 {
    1200
}
fn default_table_body_size() -> u32 {
    1100
}
fn default_table_style() -> String {
    "{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}".to_string()
}

/// Chart text defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_font_size")]
    pub font_size: u32,

    #[serde(default = "default_chart_title_size")]
    pub title_size: u32,
}

fn default_chart_font_size() -> u32 {
    1000
}
fn default_chart_title_size() -> u32 {
    1200
}

impl Default for ContractMeta {
    fn default() -> Self {
        Self {
            name: "House".to_string(),
            locale: default_locale(),
            version: default_version(),
            description: String::new(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            latin: default_latin_font(),
            east_asian: default_ea_font(),
            symbol: default_symbol_font(),
        }
    }
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            cover: 0,
            content: default_content_master(),
            blank_layout: default_blank_layout(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            line_spacing: default_line_spacing(),
            section_size: default_section_size(),
            section_color: default_body_color(),
            section_prefix: default_section_prefix(),
            margin_base: default_margin_base(),
            margin_step: default_margin_step(),
            first_level: default_first_level(),
            nested_level: default_nested_level(),
        }
    }
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            defaults: default_level_bullets(),
            styles: default_bullet_styles(),
            auto_number: default_auto_number(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            font_size: default_caption_size(),
            color: default_caption_color(),
            gap: default_caption_gap(),
            box_height: default_caption_box_height(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            top_gap: default_visual_top_gap(),
            bottom_margin: default_visual_bottom_margin(),
            gap: default_visual_gap(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
            line_height: default_line_height(),
            header_size: default_header_size(),
            body_size: default_table_body_size(),
            style_id: default_table_style(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_size: default_chart_font_size(),
            title_size: default_chart_title_size(),
        }
    }
}

impl Default for SlideContract {
    fn default() -> Self {
        Self {
            meta: ContractMeta::default(),
            fonts: FontConfig::default(),
            masters: MasterConfig::default(),
            title: default_title_box(),
            content: default_content_box(),
            cover_title: default_cover_title_box(),
            cover_info: default_cover_info_box(),
            text: TextConfig::default(),
            bullets: BulletConfig::default(),
            palette: default_palette(),
            caption: CaptionConfig::default(),
            visual: VisualConfig::default(),
            table: TableConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

impl SlideContract {
    /// Load SlideContract from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse SlideContract from a TOML string and validate it
    pub fn parse(toml_content: &str) -> Result<Self> {
        let contract: SlideContract = toml::from_str(toml_content)?;
        contract.validate()?;
        Ok(contract)
    }

    /// Build the palette described by `[palette]`
    pub fn palette(&self) -> Result<Palette> {
        Palette::from_entries(self.palette.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Default bullet style name for a nesting level
    pub fn default_bullet(&self, level: u32) -> &str {
        let defaults = &self.bullets.defaults;
        defaults
            .get(level as usize)
            .or_else(|| defaults.last())
            .map(String::as_str)
            .unwrap_or("none")
    }

    /// Indent, size and color for a nesting level
    pub fn level_style(&self, level: u32) -> &LevelStyle {
        if level == 0 {
            &self.text.first_level
        } else {
            &self.text.nested_level
        }
    }

    /// Left margin for a nesting level
    pub fn bullet_margin(&self, level: u32) -> i64 {
        self.text.margin_base + i64::from(level) * self.text.margin_step
    }

    /// Names accepted by `add_bullet`, sorted
    pub fn bullet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bullets.styles.keys().map(String::as_str).collect();
        names.extend(["number", "none"]);
        names.sort_unstable();
        names
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        self.palette()?;

        for name in &self.bullets.defaults {
            if name != "number" && name != "none" && !self.bullets.styles.contains_key(name) {
                return Err(PptxError::contract_error(format!(
                    "Default bullet '{}' is not a defined style ({})",
                    name,
                    self.bullet_names().join(", ")
                )));
            }
        }

        for (name, glyph) in &self.bullets.styles {
            if glyph.char.chars().count() != 1 {
                return Err(PptxError::contract_error(format!(
                    "Bullet style '{}' must use exactly one character",
                    name
                )));
            }
        }

        let boxes = [
            ("title", &self.title),
            ("content", &self.content),
            ("cover_title", &self.cover_title),
            ("cover_info", &self.cover_info),
        ];
        for (name, b) in boxes {
            if b.width <= 0 || b.height <= 0 {
                return Err(PptxError::contract_error(format!(
                    "Box '{}' must have a positive width and height",
                    name
                )));
            }
        }

        if self.masters.cover == self.masters.content {
            tracing::debug!(
                master = self.masters.cover,
                "cover and content slides share one master"
            );
        }

        Ok(())
    }
}
