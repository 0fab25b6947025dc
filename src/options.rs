//! Render options: the loosely typed input record and its normalized form
//!
//! Callers hand over a [`RawOptions`] (decoded from JSON, a query string or
//! CLI flags) and get back a [`RenderConfig`] via [`normalize`]. Normalization
//! is total: missing, out-of-range or wrong-shaped values are coerced to a
//! default or clamped into range, never rejected.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::calendar::parse_date;
use crate::color::Color;
use crate::{Error, Result};

/// Upper bound on cells in custom mode, so a single render stays bounded.
pub const MAX_UNITS: i64 = 100_000;

/// Weeks per year in life mode.
pub const WEEKS_PER_YEAR: u32 = 52;

/// How the cell total and the current index are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `years * 52` cells; the current index comes from a birth date.
    #[default]
    Life,
    /// The caller supplies `units` and `currentIndex` directly.
    Custom,
}

impl Mode {
    /// Exact `"custom"` selects custom mode; anything else is life mode.
    pub fn parse_or_default(s: &str) -> Self {
        if s == "custom" {
            Mode::Custom
        } else {
            Mode::Life
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Life => "life",
            Mode::Custom => "custom",
        }
    }
}

/// Dot rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shape {
    Circle,
    /// Rounded square; corner radius comes from `radius`.
    #[default]
    Square,
}

impl Shape {
    /// Exact `"circle"` selects circles; anything else is a square.
    pub fn parse_or_default(s: &str) -> Self {
        if s == "circle" {
            Shape::Circle
        } else {
            Shape::Square
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
        }
    }
}

/// A partially specified options record.
///
/// Every field is an arbitrary JSON value; `None` means "use the default".
/// Keys use the camelCase names of the wire format (`cellSize`,
/// `currentIndex`, `pastColor`, ...). Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawOptions {
    pub width: Option<Value>,
    pub height: Option<Value>,
    pub scale: Option<Value>,
    pub mode: Option<Value>,
    pub years: Option<Value>,
    pub dob: Option<Value>,
    pub units: Option<Value>,
    pub current_index: Option<Value>,
    pub columns: Option<Value>,
    pub cell_size: Option<Value>,
    pub gap: Option<Value>,
    pub radius: Option<Value>,
    pub shape: Option<Value>,
    pub dot_scale: Option<Value>,
    pub margin: Option<Value>,
    pub bg0: Option<Value>,
    pub bg1: Option<Value>,
    pub past_color: Option<Value>,
    pub current_color: Option<Value>,
    pub future_color: Option<Value>,
    pub caption: Option<Value>,
    pub caption_color: Option<Value>,
    pub caption_weight: Option<Value>,
    pub caption_italic: Option<Value>,
    pub caption_font: Option<Value>,
    pub custom_text: Option<Value>,
    pub show_percent: Option<Value>,
}

macro_rules! merge_fields {
    ($dst:ident, $src:ident; $($field:ident),+ $(,)?) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field;
            }
        )+
    };
}

impl RawOptions {
    /// Decode from a JSON value; the value must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::ConfigError(
                "options document must be a JSON object".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Decode from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Overlay `other` on top of `self`: fields set in `other` win.
    pub fn merge(mut self, other: RawOptions) -> Self {
        merge_fields!(self, other;
            width, height, scale, mode, years, dob, units, current_index,
            columns, cell_size, gap, radius, shape, dot_scale, margin,
            bg0, bg1, past_color, current_color, future_color,
            caption, caption_color, caption_weight, caption_italic, caption_font,
            custom_text, show_percent,
        );
        self
    }
}

/// The canonical, fully validated render configuration.
///
/// Built fresh for each render by [`normalize`] / [`normalize_with`] and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Output pixel density; multiplies resolution, not layout units.
    pub scale: f64,
    pub mode: Mode,
    pub years: u32,
    pub dob: Option<DateTime<Utc>>,
    /// Total cells in custom mode.
    pub units: Option<u32>,
    /// Zero-based current cell, `-1` for none.
    pub current_index: i64,
    pub columns: u32,
    pub cell_size: u32,
    pub gap: u32,
    pub radius: u32,
    pub shape: Shape,
    pub dot_scale: f64,
    pub margin: u32,
    pub bg0: Color,
    pub bg1: Color,
    pub past_color: Color,
    pub current_color: Color,
    pub future_color: Color,
    pub caption: String,
    pub caption_color: Color,
    pub caption_weight: u16,
    pub caption_italic: bool,
    pub caption_font: String,
    pub custom_text: String,
    pub show_percent: bool,
}

impl Default for RenderConfig {
    /// Interactive maker profile: a desktop life calendar.
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            scale: 1.0,
            mode: Mode::Life,
            years: 90,
            dob: None,
            units: None,
            current_index: -1,
            columns: 52,
            cell_size: 14,
            gap: 2,
            radius: 3,
            shape: Shape::Square,
            dot_scale: 1.0,
            margin: 40,
            bg0: Color::rgb(0x0b, 0x0c, 0x0f),
            bg1: Color::rgb(0x1a, 0x0f, 0x2b),
            past_color: Color::rgb(0x5c, 0xc8, 0xff),
            current_color: Color::rgb(0xf5, 0x9e, 0x0b),
            future_color: Color::rgba(255, 255, 255, 0.16),
            caption: "My Life in Weeks".to_string(),
            caption_color: Color::rgba(255, 255, 255, 0.92),
            caption_weight: 600,
            caption_italic: false,
            caption_font: "system-ui, -apple-system, Segoe UI, Roboto, Noto Sans Thai, sans-serif"
                .to_string(),
            custom_text: "active".to_string(),
            show_percent: true,
        }
    }
}

impl RenderConfig {
    /// HTTP endpoint profile: a phone-sized custom progress grid.
    pub fn api() -> Self {
        Self {
            width: 1179,
            height: 2556,
            mode: Mode::Custom,
            columns: 15,
            cell_size: 50,
            shape: Shape::Circle,
            dot_scale: 0.9,
            caption: String::new(),
            caption_weight: 700,
            caption_font: "sans-serif".to_string(),
            ..Self::default()
        }
    }

    /// Express this configuration as raw options; normalizing the result
    /// yields an equal configuration.
    pub fn to_raw(&self) -> RawOptions {
        RawOptions {
            width: Some(self.width.into()),
            height: Some(self.height.into()),
            scale: Some(self.scale.into()),
            mode: Some(self.mode.as_str().into()),
            years: Some(self.years.into()),
            dob: self
                .dob
                .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true).into()),
            units: Some(self.units.map_or(Value::Null, Value::from)),
            current_index: Some(self.current_index.into()),
            columns: Some(self.columns.into()),
            cell_size: Some(self.cell_size.into()),
            gap: Some(self.gap.into()),
            radius: Some(self.radius.into()),
            shape: Some(self.shape.as_str().into()),
            dot_scale: Some(self.dot_scale.into()),
            margin: Some(self.margin.into()),
            bg0: Some(self.bg0.to_string().into()),
            bg1: Some(self.bg1.to_string().into()),
            past_color: Some(self.past_color.to_string().into()),
            current_color: Some(self.current_color.to_string().into()),
            future_color: Some(self.future_color.to_string().into()),
            caption: Some(self.caption.clone().into()),
            caption_color: Some(self.caption_color.to_string().into()),
            caption_weight: Some(self.caption_weight.into()),
            caption_italic: Some(self.caption_italic.into()),
            caption_font: Some(self.caption_font.clone().into()),
            custom_text: Some(self.custom_text.clone().into()),
            show_percent: Some(self.show_percent.into()),
        }
    }
}

/// Normalize against the maker profile ([`RenderConfig::default`]).
pub fn normalize(raw: &RawOptions) -> RenderConfig {
    normalize_with(raw, &RenderConfig::default())
}

/// Normalize `raw` over the given defaults profile.
pub fn normalize_with(raw: &RawOptions, defaults: &RenderConfig) -> RenderConfig {
    let int = |v: &Option<Value>, default: u32, lo: i64, hi: i64| -> u32 {
        v.as_ref()
            .map_or(default as i64, coerce_int)
            .clamp(lo, hi) as u32
    };
    let float = |v: &Option<Value>, default: f64, lo: f64, hi: f64| -> f64 {
        v.as_ref().map_or(default, coerce_float).clamp(lo, hi)
    };
    let color = |v: &Option<Value>, default: Color| -> Color {
        v.as_ref().map_or(default, |v| coerce_color(v, default))
    };
    let text = |v: &Option<Value>, default: &str| -> String {
        v.as_ref().map_or_else(|| default.to_string(), coerce_text)
    };
    let flag = |v: &Option<Value>, default: bool| -> bool {
        v.as_ref().map_or(default, coerce_bool)
    };

    let mode = match &raw.mode {
        Some(Value::String(s)) => Mode::parse_or_default(s),
        Some(_) => Mode::Life,
        None => defaults.mode,
    };
    let shape = match &raw.shape {
        Some(Value::String(s)) => Shape::parse_or_default(s),
        Some(_) => Shape::Square,
        None => defaults.shape,
    };

    let caption_weight = match &raw.caption_weight {
        Some(v) => {
            let w = coerce_int(v);
            if (100..=900).contains(&w) {
                w as u16
            } else {
                defaults.caption_weight
            }
        }
        None => defaults.caption_weight,
    };

    let dob = match &raw.dob {
        Some(Value::String(s)) => parse_date(s),
        Some(Value::Number(n)) => parse_date(&n.to_string()),
        Some(_) => None,
        None => defaults.dob,
    };

    let (units, current_index) = match mode {
        Mode::Custom => {
            let units = match &raw.units {
                Some(v) => finite_int(v)
                    .filter(|n| *n > 0)
                    .map(|n| n.min(MAX_UNITS) as u32),
                None => defaults.units,
            };
            let index = match &raw.current_index {
                Some(v) => finite_int(v).unwrap_or(-1),
                None => defaults.current_index,
            };
            let index = match units {
                Some(total) => index.clamp(-1, total as i64 - 1),
                None => -1,
            };
            (units, index)
        }
        Mode::Life => (None, -1),
    };

    RenderConfig {
        width: int(&raw.width, defaults.width, 320, 8192),
        height: int(&raw.height, defaults.height, 320, 8192),
        scale: float(&raw.scale, defaults.scale, 1.0, 4.0),
        mode,
        years: int(&raw.years, defaults.years, 50, 120),
        dob,
        units,
        current_index,
        columns: int(&raw.columns, defaults.columns, 1, 400),
        cell_size: int(&raw.cell_size, defaults.cell_size, 6, 64),
        gap: int(&raw.gap, defaults.gap, 0, 24),
        radius: int(&raw.radius, defaults.radius, 0, 24),
        shape,
        dot_scale: float(&raw.dot_scale, defaults.dot_scale, 0.3, 1.0),
        margin: int(&raw.margin, defaults.margin, 0, 300),
        bg0: color(&raw.bg0, defaults.bg0),
        bg1: color(&raw.bg1, defaults.bg1),
        past_color: color(&raw.past_color, defaults.past_color),
        current_color: color(&raw.current_color, defaults.current_color),
        future_color: color(&raw.future_color, defaults.future_color),
        caption: text(&raw.caption, &defaults.caption),
        caption_color: color(&raw.caption_color, defaults.caption_color),
        caption_weight,
        caption_italic: flag(&raw.caption_italic, defaults.caption_italic),
        caption_font: text(&raw.caption_font, &defaults.caption_font),
        custom_text: text(&raw.custom_text, &defaults.custom_text),
        show_percent: flag(&raw.show_percent, defaults.show_percent),
    }
}

/// Integer coercion: leading decimal digits of the textual form, else 0.
fn coerce_int(v: &Value) -> i64 {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map_or(0, |f| f.trunc() as i64),
        },
        Value::String(s) => parse_int_prefix(s),
        _ => 0,
    }
}

fn parse_int_prefix(s: &str) -> i64 {
    let t = s.trim_start();
    let (negative, digits) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let end = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return 0;
    }
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Float coercion: numeric value, with 0 and non-numbers collapsing to 1.
fn coerce_float(v: &Value) -> f64 {
    let f = match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Bool(true) => 1.0,
        _ => f64::NAN,
    };
    if f.is_nan() || f == 0.0 {
        1.0
    } else {
        f
    }
}

fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    match t {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ => t
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN),
    }
}

/// A JSON number that is finite, truncated to an integer.
fn finite_int(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    }
}

fn coerce_bool(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strings pass through; other falsy values (`null`, `false`, `0`) are empty.
fn coerce_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other if !coerce_bool(other) => String::new(),
        other => other.to_string(),
    }
}

fn coerce_color(v: &Value, fallback: Color) -> Color {
    match v {
        Value::String(s) => Color::parse(s).unwrap_or_else(|_| {
            log::debug!("unrecognized color {:?}; using {}", s, fallback);
            fallback
        }),
        _ => fallback,
    }
}
