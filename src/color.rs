//! Color values and the small CSS color dialect accepted in options
//!
//! Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)` (channels as numbers or percentages), and the
//! keywords `transparent`, `black`, `white`.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// An sRGB color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a: clamp_alpha(a) }
    }

    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0.0 };

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Alpha quantized to a byte.
    pub fn alpha_u8(&self) -> u8 {
        (self.a * 255.0).round() as u8
    }

    /// Combine a `#rrggbb` color with an opacity percentage.
    ///
    /// Each channel is read from two hex digits; the percentage is clamped
    /// to `[0, 100]` and becomes the alpha channel. Returns `None` when the
    /// hex form is not six hex digits after `#`.
    pub fn with_opacity(hex: &str, opacity_percent: i64) -> Option<Color> {
        let digits = hex.trim().strip_prefix('#')?.get(..6)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let alpha = opacity_percent.clamp(0, 100) as f32 / 100.0;
        Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Parse a color string; see the module docs for the accepted forms.
    pub fn parse(input: &str) -> Result<Color> {
        let s = input.trim().to_ascii_lowercase();
        let invalid = || Error::Other(format!("unrecognized color: {:?}", input));

        match s.as_str() {
            "transparent" => return Ok(Color::TRANSPARENT),
            "black" => return Ok(Color::rgb(0, 0, 0)),
            "white" => return Ok(Color::rgb(255, 255, 255)),
            _ => {}
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }

        let body = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(invalid());
        }
        let r = parse_channel(parts[0]).ok_or_else(invalid)?;
        let g = parse_channel(parts[1]).ok_or_else(invalid)?;
        let b = parse_channel(parts[2]).ok_or_else(invalid)?;
        let a = match parts.get(3) {
            Some(p) => parse_alpha(p).ok_or_else(invalid)?,
            None => 1.0,
        };
        Ok(Color::rgba(r, g, b, a))
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

fn clamp_alpha(a: f32) -> f32 {
    if a.is_nan() {
        0.0
    } else {
        a.clamp(0.0, 1.0)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)? as f32 / 255.0)),
        6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(Color::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)? as f32 / 255.0)),
        _ => None,
    }
}

fn parse_channel(s: &str) -> Option<u8> {
    let v = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? * 2.55,
        None => s.parse::<f32>().ok()?,
    };
    if v.is_nan() {
        return None;
    }
    Some(v.clamp(0.0, 255.0).round() as u8)
}

fn parse_alpha(s: &str) -> Option<f32> {
    let v = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().ok()? / 100.0,
        None => s.parse::<f32>().ok()?,
    };
    if v.is_nan() {
        return None;
    }
    Some(clamp_alpha(v))
}
