use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque RGB color, always rendered as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(u32);

impl Color {
    /// Convert from hex u32 (0xRRGGBB)
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00FF_FFFF)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub const fn to_hex(self) -> u32 {
        self.0
    }

    /// Parse `#RGB`, `#RRGGBB` or `rgb(r, g, b)` (what a browser reports back
    /// for inline styles). Alpha in `rgba(...)` is ignored.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::new(input));
        }

        let lower = s.to_ascii_lowercase();
        let inner = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(inner) = inner {
            let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
            if parts.len() == 3 || parts.len() == 4 {
                let channel = |p: &str| p.parse::<u8>().ok();
                if let (Some(r), Some(g), Some(b)) = (channel(parts[0]), channel(parts[1]), channel(parts[2])) {
                    return Ok(Self::from_rgb(r, g, b));
                }
            }
        }

        Err(ColorParseError::new(input))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok().map(Color::from_hex)
        }
        6 => u32::from_str_radix(hex, 16).ok().map(Color::from_hex),
        _ => None,
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Input that could not be read as a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    input: String,
}

impl ColorParseError {
    fn new(input: &str) -> Self {
        Self { input: input.to_string() }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a color: '{}'", self.input)
    }
}

impl std::error::Error for ColorParseError {}

/// Which half of a cell's style a color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorField {
    #[serde(rename = "bg")]
    Background,
    #[serde(rename = "color")]
    Text,
}

impl ColorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorField::Background => "bg",
            ColorField::Text => "color",
        }
    }
}

impl FromStr for ColorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bg" | "background" => Ok(ColorField::Background),
            "color" | "text" => Ok(ColorField::Text),
            other => Err(format!("unknown color field '{}' (expected bg or text)", other)),
        }
    }
}

/// A manually assigned cell color. Stored keys mirror the persisted format:
/// `bg` for the background, `color` for the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellColor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl CellColor {
    pub fn background(color: Color) -> Self {
        Self { bg: Some(color), color: None }
    }

    pub fn text(color: Color) -> Self {
        Self { bg: None, color: Some(color) }
    }

    pub fn is_empty(&self) -> bool {
        self.bg.is_none() && self.color.is_none()
    }

    pub fn get(&self, field: ColorField) -> Option<Color> {
        match field {
            ColorField::Background => self.bg,
            ColorField::Text => self.color,
        }
    }

    /// Return a copy with one field replaced, leaving the other untouched.
    pub fn with(mut self, field: ColorField, value: Option<Color>) -> Self {
        match field {
            ColorField::Background => self.bg = value,
            ColorField::Text => self.color = value,
        }
        self
    }
}
