//! Color values
//!
//! Colors are plain 24-bit RGB. A [`TextColor`] pairs a foreground with a
//! background and is what every scope resolves to.

use std::fmt;
use std::str::FromStr;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Names accepted wherever a color literal is expected
const NAMED: &[(&str, Color)] = &[
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("cyan", Color::rgb(0x00, 0xff, 0xff)),
    ("magenta", Color::rgb(0xff, 0x00, 0xff)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`; `None` if any bit above 24 is set
    pub fn from_u32(value: u32) -> Option<Self> {
        if value > 0xff_ffff {
            return None;
        }
        Some(Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
    }

    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Parse a color literal
    ///
    /// Accepts `#RRGGBB`, `#RGB`, `0xRRGGBB` and a small set of names
    /// (case-insensitive). Returns `None` for anything else so callers can
    /// fall back to aliases.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if !is_hex(hex) {
                return None;
            }
            return match hex.len() {
                6 => u32::from_str_radix(hex, 16).ok().and_then(Self::from_u32),
                3 => {
                    let v = u32::from_str_radix(hex, 16).ok()?;
                    let expand = |n: u32| (n * 0x11) as u8;
                    Some(Self::rgb(expand(v >> 8), expand((v >> 4) & 0xf), expand(v & 0xf)))
                }
                _ => None,
            };
        }
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            if hex.is_empty() || hex.len() > 6 || !is_hex(hex) {
                return None;
            }
            return u32::from_str_radix(hex, 16).ok().and_then(Self::from_u32);
        }
        NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, color)| *color)
    }
}

fn is_hex(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_hexdigit())
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid color '{}'", s))
    }
}

/// Foreground/background pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextColor {
    pub foreground: Color,
    pub background: Color,
}

impl TextColor {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }

    /// Builder: replace the foreground
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    /// Builder: replace the background
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.foreground, self.background)
    }
}
