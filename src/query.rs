//! The `/api/wallpaper` query string: decoding into render options and
//! building share links that point at it

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use url::{form_urlencoded, Url};

use crate::calendar::ProgressStyle;
use crate::color::Color;
use crate::devices::DevicePreset;
use crate::options::{normalize_with, RawOptions, RenderConfig, Shape};
use crate::{Error, Result};

pub const WALLPAPER_PATH: &str = "/api/wallpaper";

const DEFAULT_FUTURE_OPACITY: i64 = 16;

/// First value of each parameter; an empty value counts as absent.
struct Params<'a> {
    pairs: Vec<(std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
}

impl<'a> Params<'a> {
    fn parse(query: &'a str) -> Self {
        Self {
            pairs: form_urlencoded::parse(query.as_bytes()).collect(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
            .filter(|v| !v.is_empty())
    }

    fn text(&self, key: &str, default: &str) -> Value {
        json!(self.get(key).unwrap_or(default))
    }
}

/// Decode the endpoint's query parameters into raw options.
///
/// Accepts a bare query or a request target (`/api/wallpaper?...`). The
/// grid tracks the period of `style` that contains `now`'s date; the
/// caption, unit count and current cell come from that period.
pub fn raw_options_from_query(query: &str, now: DateTime<Utc>) -> RawOptions {
    let query = match query.split_once('?') {
        Some((_, q)) => q,
        None => query,
    };
    let params = Params::parse(query);

    let style_param = params.get("style").unwrap_or("days");
    let preset = ProgressStyle::from_query(Some(style_param)).preset(now.date_naive());
    let default_columns = match style_param {
        "weeks" => 52,
        "months" => 4,
        _ => 15,
    };

    let opacity = params
        .get("futureOpacity")
        .and_then(parse_int)
        .unwrap_or(DEFAULT_FUTURE_OPACITY);
    let future = params.get("future").unwrap_or("#ffffff");
    let future_color = match Color::with_opacity(future, opacity) {
        Some(c) => Some(json!(c.to_string())),
        None => {
            log::debug!("future color {:?} is not #rrggbb; using default", future);
            None
        }
    };

    RawOptions {
        width: Some(params.text("width", "1179")),
        height: Some(params.text("height", "2556")),
        scale: Some(json!(1)),
        mode: Some(json!("custom")),
        units: Some(json!(preset.units)),
        current_index: Some(json!(preset.current_index)),
        columns: Some(match params.get("columns") {
            Some(c) => json!(c),
            None => json!(default_columns),
        }),
        caption: Some(json!(preset.caption)),
        cell_size: Some(params.text("cellSize", "50")),
        gap: Some(params.text("gap", "2")),
        radius: Some(params.text("radius", "3")),
        dot_scale: Some(params.get("dotScale").map_or(json!(0.9), |s| {
            parse_float_prefix(s).map_or(Value::Null, Value::from)
        })),
        shape: Some(params.text("shape", "circle")),
        margin: Some(json!(40)),
        bg0: Some(params.text("bg0", "#0b0c0f")),
        bg1: Some(params.text("bg1", "#1a0f2b")),
        past_color: Some(params.text("past", "#5cc8ff")),
        current_color: Some(params.text("current", "#f59e0b")),
        future_color,
        caption_font: Some(json!("sans-serif")),
        caption_weight: Some(json!(700)),
        caption_italic: Some(json!(false)),
        custom_text: Some(params.text("customText", "active")),
        show_percent: Some(json!(params.get("showPercent") == Some("1"))),
        ..Default::default()
    }
}

/// Decode and normalize over the HTTP profile ([`RenderConfig::api`]).
pub fn config_from_query(query: &str, now: DateTime<Utc>) -> RenderConfig {
    normalize_with(&raw_options_from_query(query, now), &RenderConfig::api())
}

fn parse_int(s: &str) -> Option<i64> {
    let t = s.trim_start();
    let digits = t.strip_prefix(['-', '+']).unwrap_or(t);
    let end = digits.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    let n: i64 = digits[..end].parse().ok()?;
    Some(if t.starts_with('-') { -n } else { n })
}

/// Longest leading decimal number (`"0.75px"` -> `0.75`).
fn parse_float_prefix(s: &str) -> Option<f64> {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    t[..end].parse().ok()
}

/// Parameters of a shareable wallpaper URL, as a phone shortcut would fetch
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub width: u32,
    pub height: u32,
    pub style: ProgressStyle,
    pub cell_size: u32,
    pub gap: u32,
    pub radius: u32,
    /// Dot size as a percentage of the cell.
    pub dot_scale_percent: u32,
    pub shape: Shape,
    pub columns: u32,
    pub bg0: String,
    pub bg1: String,
    pub past: String,
    pub current: String,
    pub future: String,
    pub future_opacity: u32,
    pub custom_text: String,
    pub show_percent: bool,
}

impl Default for ShareLink {
    fn default() -> Self {
        Self {
            width: 1320,
            height: 2868,
            style: ProgressStyle::Days,
            cell_size: 50,
            gap: 2,
            radius: 3,
            dot_scale_percent: 90,
            shape: Shape::Circle,
            columns: ProgressStyle::Days.default_columns(),
            bg0: "#0b0c0f".into(),
            bg1: "#1a0f2b".into(),
            past: "#5cc8ff".into(),
            current: "#f59e0b".into(),
            future: "#ffffff".into(),
            future_opacity: 16,
            custom_text: "active".into(),
            show_percent: true,
        }
    }
}

impl ShareLink {
    pub fn for_device(device: &DevicePreset) -> Self {
        Self {
            width: device.width,
            height: device.height,
            ..Self::default()
        }
    }

    /// Switch style and reset the column count to that style's default.
    pub fn with_style(mut self, style: ProgressStyle) -> Self {
        self.style = style;
        self.columns = style.default_columns();
        self
    }

    /// The urlencoded parameters, in a fixed key order.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("height", &self.height.to_string())
            .append_pair("width", &self.width.to_string())
            .append_pair("style", self.style.as_str())
            .append_pair("cellSize", &self.cell_size.to_string())
            .append_pair("gap", &self.gap.to_string())
            .append_pair("radius", &self.radius.to_string())
            .append_pair(
                "dotScale",
                &format!("{:.2}", self.dot_scale_percent as f64 / 100.0),
            )
            .append_pair("shape", self.shape.as_str())
            .append_pair("columns", &self.columns.to_string())
            .append_pair("bg0", &self.bg0)
            .append_pair("bg1", &self.bg1)
            .append_pair("past", &self.past)
            .append_pair("current", &self.current)
            .append_pair("future", &self.future)
            .append_pair("futureOpacity", &self.future_opacity.to_string())
            .append_pair("customText", &self.custom_text)
            .append_pair("showPercent", if self.show_percent { "1" } else { "0" })
            .finish()
    }

    /// `<base>/api/wallpaper?<params>`; `base` is an origin such as
    /// `https://example.com`, optionally with a path prefix.
    pub fn to_url(&self, base: &str) -> Result<String> {
        let mut url = Url::parse(base)
            .map_err(|e| Error::ConfigError(format!("invalid base URL {:?}: {}", base, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::ConfigError(format!(
                "base URL {:?} cannot carry a path",
                base
            )));
        }
        let path = format!("{}{}", url.path().trim_end_matches('/'), WALLPAPER_PATH);
        url.set_path(&path);
        url.set_query(Some(&self.query_string()));
        url.set_fragment(None);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_date;
    use crate::options::Mode;

    fn now() -> DateTime<Utc> {
        // 100th day of a non-leap year
        parse_date("2026-04-10T12:00:00Z").unwrap()
    }

    #[test]
    fn empty_query_uses_endpoint_defaults() {
        let cfg = config_from_query("", now());
        assert_eq!((cfg.width, cfg.height), (1179, 2556));
        assert_eq!(cfg.mode, Mode::Custom);
        assert_eq!(cfg.units, Some(365));
        assert_eq!(cfg.current_index, 99);
        assert_eq!(cfg.columns, 15);
        assert_eq!(cfg.cell_size, 50);
        assert_eq!(cfg.shape, Shape::Circle);
        assert_eq!(cfg.dot_scale, 0.9);
        assert_eq!(cfg.future_color, Color::rgba(255, 255, 255, 0.16));
        assert_eq!(cfg.caption, "Progress of Year — 2026");
        assert_eq!(cfg.caption_weight, 700);
        assert_eq!(cfg.caption_font, "sans-serif");
        assert!(!cfg.show_percent);
        assert_eq!(cfg.custom_text, "active");
    }

    #[test]
    fn style_selects_period_and_columns() {
        let cfg = config_from_query("style=weeks", now());
        assert_eq!((cfg.units, cfg.current_index, cfg.columns), (Some(52), 14, 52));

        let cfg = config_from_query("style=months", now());
        assert_eq!((cfg.units, cfg.current_index, cfg.columns), (Some(12), 3, 4));
        assert_eq!(cfg.caption, "Year Progress - 12 Months");

        // unknown styles render months but keep the generic column default
        let cfg = config_from_query("style=decades", now());
        assert_eq!((cfg.units, cfg.columns), (Some(12), 15));
    }

    #[test]
    fn request_target_and_encoding() {
        let cfg = config_from_query(
            "/api/wallpaper?customText=so+far&past=%23ff0000&showPercent=1&columns=20",
            now(),
        );
        assert_eq!(cfg.custom_text, "so far");
        assert_eq!(cfg.past_color, Color::rgb(255, 0, 0));
        assert!(cfg.show_percent);
        assert_eq!(cfg.columns, 20);
    }

    #[test]
    fn numbers_are_parsed_leniently() {
        let cfg = config_from_query("width=abc&cellSize=999&dotScale=0.5x&gap=", now());
        assert_eq!(cfg.width, 320);
        assert_eq!(cfg.cell_size, 64);
        assert_eq!(cfg.dot_scale, 0.5);
        assert_eq!(cfg.gap, 2);

        let cfg = config_from_query("dotScale=nope", now());
        assert_eq!(cfg.dot_scale, 1.0);
    }

    #[test]
    fn future_opacity_combines_with_hex() {
        let cfg = config_from_query("future=%2300ff00&futureOpacity=50", now());
        assert_eq!(cfg.future_color, Color::rgba(0, 255, 0, 0.5));
        // not #rrggbb: the profile default stands
        let cfg = config_from_query("future=green&futureOpacity=50", now());
        assert_eq!(cfg.future_color, Color::rgba(255, 255, 255, 0.16));
    }

    #[test]
    fn share_link_key_order_and_format() {
        let link = ShareLink::default();
        assert_eq!(
            link.query_string(),
            "height=2868&width=1320&style=days&cellSize=50&gap=2&radius=3&dotScale=0.90\
             &shape=circle&columns=15&bg0=%230b0c0f&bg1=%231a0f2b&past=%235cc8ff\
             &current=%23f59e0b&future=%23ffffff&futureOpacity=16&customText=active\
             &showPercent=1"
        );
    }

    #[test]
    fn share_link_url_round_trips_through_decoder() {
        let link = ShareLink {
            custom_text: "of 2026".into(),
            show_percent: false,
            ..ShareLink::default().with_style(ProgressStyle::Weeks)
        };
        let url = link.to_url("https://walls.example.com/").unwrap();
        assert!(url.starts_with("https://walls.example.com/api/wallpaper?height=2868"));

        let cfg = config_from_query(&url, now());
        assert_eq!((cfg.width, cfg.height, cfg.columns), (1320, 2868, 52));
        assert_eq!(cfg.custom_text, "of 2026");
        assert!(!cfg.show_percent);
    }

    #[test]
    fn share_link_rejects_bad_base() {
        assert!(ShareLink::default().to_url("not a url").is_err());
        assert!(ShareLink::default().to_url("mailto:me@example.com").is_err());
    }
}
