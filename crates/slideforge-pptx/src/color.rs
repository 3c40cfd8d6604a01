//! Color resolution.
//!
//! Colors reach the API in several spellings: an [`Rgb`] value, a hex code
//! with or without `#`, a decimal `"R,G,B"` triple or a palette name. All of
//! them normalize to [`Rgb`]; anything else is an error that lists the
//! accepted forms.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{PptxError, Result};

/// A 24-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uppercase `RRGGBB`, as written into `a:srgbClr/@val`
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    fn from_hex_digits(digits: &str) -> Option<Self> {
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    fn from_triple(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }
        Some(Self::new(channels[0], channels[1], channels[2]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.hex())
    }
}

impl FromStr for Rgb {
    type Err = PptxError;

    fn from_str(s: &str) -> Result<Self> {
        resolve_color(s)
    }
}

/// Named colors available to markup and color arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: BTreeMap<String, Rgb>,
}

/// The house palette
pub const DEFAULT_PALETTE: [(&str, Rgb); 9] = [
    ("red", Rgb::new(0xC0, 0x00, 0x00)),
    ("green", Rgb::new(0x00, 0xB0, 0x50)),
    ("blue", Rgb::new(0x00, 0x70, 0xC0)),
    ("orange", Rgb::new(0xFF, 0x7F, 0x00)),
    ("purple", Rgb::new(0x70, 0x30, 0xA0)),
    ("navy", Rgb::new(0x07, 0x2A, 0x5E)),
    ("teal", Rgb::new(0x00, 0x80, 0x80)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("grey", Rgb::new(0x80, 0x80, 0x80)),
];

impl Default for Palette {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PALETTE
                .iter()
                .map(|(name, rgb)| (name.to_string(), *rgb))
                .collect(),
        }
    }
}

impl Palette {
    /// An empty palette
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Shared instance of the default palette
    pub fn house() -> &'static Palette {
        static HOUSE: OnceLock<Palette> = OnceLock::new();
        HOUSE.get_or_init(Palette::default)
    }

    /// Build a palette from `name -> color` strings (hex or triple)
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        let mut palette = Self::empty();
        for (name, value) in entries {
            let rgb = parse_literal(value).ok_or_else(|| PptxError::InvalidColor {
                value: value.to_string(),
                reason: format!("palette entry '{}' must be RRGGBB or \"R,G,B\"", name),
            })?;
            palette.insert(name, rgb);
        }
        Ok(palette)
    }

    /// Add or replace a named color (names are case-insensitive)
    pub fn insert(&mut self, name: &str, rgb: Rgb) {
        self.entries.insert(name.to_lowercase(), rgb);
    }

    /// Look up a name, case-insensitively
    pub fn get(&self, name: &str) -> Option<Rgb> {
        self.entries.get(&name.to_lowercase()).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve any accepted color spelling against this palette
    pub fn resolve(&self, value: &str) -> Result<Rgb> {
        let trimmed = value.trim();
        if let Some(rgb) = parse_literal(trimmed).or_else(|| self.get(trimmed)) {
            return Ok(rgb);
        }
        let names: Vec<&str> = self.names().collect();
        Err(PptxError::InvalidColor {
            value: value.to_string(),
            reason: format!(
                "expected #RRGGBB, RRGGBB, \"R,G,B\" or a color name ({})",
                names.join(", ")
            ),
        })
    }

    /// Resolve a markup token: `#RRGGBB` or a palette name
    pub fn resolve_token(&self, token: &str) -> Option<Rgb> {
        match token.strip_prefix('#') {
            Some(digits) => Rgb::from_hex_digits(digits),
            None => self.get(token),
        }
    }
}

fn parse_literal(value: &str) -> Option<Rgb> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    Rgb::from_hex_digits(digits).or_else(|| Rgb::from_triple(value))
}

/// Resolve a color string against the house palette
pub fn resolve_color(value: &str) -> Result<Rgb> {
    Palette::house().resolve(value)
}

/// A color argument that is resolved when the element is placed
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    Rgb(Rgb),
    Named(String),
}

impl ColorSpec {
    pub fn resolve(&self, palette: &Palette) -> Result<Rgb> {
        match self {
            Self::Rgb(rgb) => Ok(*rgb),
            Self::Named(value) => palette.resolve(value),
        }
    }
}

impl From<Rgb> for ColorSpec {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

impl From<&str> for ColorSpec {
    fn from(value: &str) -> Self {
        Self::Named(value.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}
