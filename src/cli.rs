//! Command line definitions and the mapping from flags to render options

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use lifegrid::calendar::{parse_date, ProgressStyle};
use lifegrid::devices;
use lifegrid::{RawOptions, RenderConfig, Shape, ShareLink};

#[derive(Debug, Parser)]
#[command(name = "lifegrid")]
#[command(about = "Life calendar and progress grid wallpapers", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a wallpaper to a PNG file
    Render(RenderArgs),
    /// Serve wallpapers over HTTP at /api/wallpaper
    #[cfg(feature = "server")]
    Serve(ServeArgs),
    /// Print a share URL for the HTTP endpoint
    Url(UrlArgs),
    /// List device presets
    Devices,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// JSON file with render options (camelCase keys); flags override it
    #[arg(long)]
    pub options: Option<PathBuf>,
    /// Phone preset label (or part of it) for width and height
    #[arg(long)]
    pub device: Option<String>,
    /// Desktop preset label (or part of it) for size, cell size and gap
    #[arg(long)]
    pub desktop: Option<String>,
    /// Calendar progress preset: days, weeks, months, week, month, year
    #[arg(long)]
    pub preset: Option<String>,
    /// Instant to render for (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long)]
    pub now: Option<String>,
    /// Preferred TTF/OTF file for text; installed fonts are matched otherwise
    #[arg(long)]
    pub font: Option<PathBuf>,
    /// Also print the image as a data URL
    #[arg(long = "data-url")]
    pub data_url: bool,
    /// Output file; defaults to the wallpaper's download name
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub scale: Option<f64>,
    /// life or custom
    #[arg(long)]
    pub mode: Option<String>,
    #[arg(long)]
    pub years: Option<u32>,
    /// Date of birth for life mode
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub units: Option<i64>,
    #[arg(long = "current-index", allow_hyphen_values = true)]
    pub current_index: Option<i64>,
    #[arg(long)]
    pub columns: Option<u32>,
    #[arg(long = "cell-size")]
    pub cell_size: Option<u32>,
    #[arg(long)]
    pub gap: Option<u32>,
    #[arg(long)]
    pub radius: Option<u32>,
    /// circle or square
    #[arg(long)]
    pub shape: Option<String>,
    #[arg(long = "dot-scale")]
    pub dot_scale: Option<f64>,
    #[arg(long)]
    pub margin: Option<u32>,
    #[arg(long)]
    pub bg0: Option<String>,
    #[arg(long)]
    pub bg1: Option<String>,
    #[arg(long = "past-color")]
    pub past_color: Option<String>,
    #[arg(long = "current-color")]
    pub current_color: Option<String>,
    #[arg(long = "future-color")]
    pub future_color: Option<String>,
    #[arg(long)]
    pub caption: Option<String>,
    #[arg(long = "caption-color")]
    pub caption_color: Option<String>,
    #[arg(long = "caption-weight")]
    pub caption_weight: Option<u32>,
    #[arg(long = "caption-italic")]
    pub caption_italic: Option<bool>,
    #[arg(long = "caption-font")]
    pub caption_font: Option<String>,
    #[arg(long = "custom-text")]
    pub custom_text: Option<String>,
    #[arg(long = "show-percent")]
    pub show_percent: Option<bool>,
}

impl RenderArgs {
    pub fn now(&self) -> Result<DateTime<Utc>> {
        match &self.now {
            Some(s) => parse_date(s).ok_or_else(|| anyhow!("invalid --now value: {:?}", s)),
            None => Ok(Utc::now()),
        }
    }

    /// Layer the option sources: file, device preset, calendar preset,
    /// then individual flags.
    pub fn raw_options(&self, now: DateTime<Utc>) -> Result<RawOptions> {
        let mut raw = match &self.options {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                RawOptions::from_json(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => RawOptions::default(),
        };

        if let Some(name) = &self.device {
            let device = devices::find_phone(name)
                .ok_or_else(|| anyhow!("unknown device {:?}; see `lifegrid devices`", name))?;
            log::info!("device {} ({}x{})", device.label, device.width, device.height);
            raw = raw.merge(device.to_raw());
        }
        if let Some(name) = &self.desktop {
            let preset = devices::find_desktop(name)
                .ok_or_else(|| anyhow!("unknown desktop preset {:?}", name))?;
            raw = raw.merge(preset.to_raw());
        }
        if let Some(style) = &self.preset {
            let style = ProgressStyle::parse(style)
                .ok_or_else(|| anyhow!("unknown preset {:?}", style))?;
            raw = raw.merge(style.preset(now.date_naive()).to_raw());
        }

        Ok(raw.merge(self.flag_options()))
    }

    fn flag_options(&self) -> RawOptions {
        RawOptions {
            width: self.width.map(|v| json!(v)),
            height: self.height.map(|v| json!(v)),
            scale: self.scale.map(|v| json!(v)),
            mode: self.mode.as_ref().map(|v| json!(v)),
            years: self.years.map(|v| json!(v)),
            dob: self.dob.as_ref().map(|v| json!(v)),
            units: self.units.map(|v| json!(v)),
            current_index: self.current_index.map(|v| json!(v)),
            columns: self.columns.map(|v| json!(v)),
            cell_size: self.cell_size.map(|v| json!(v)),
            gap: self.gap.map(|v| json!(v)),
            radius: self.radius.map(|v| json!(v)),
            shape: self.shape.as_ref().map(|v| json!(v)),
            dot_scale: self.dot_scale.map(|v| json!(v)),
            margin: self.margin.map(|v| json!(v)),
            bg0: self.bg0.as_ref().map(|v| json!(v)),
            bg1: self.bg1.as_ref().map(|v| json!(v)),
            past_color: self.past_color.as_ref().map(|v| json!(v)),
            current_color: self.current_color.as_ref().map(|v| json!(v)),
            future_color: self.future_color.as_ref().map(|v| json!(v)),
            caption: self.caption.as_ref().map(|v| json!(v)),
            caption_color: self.caption_color.as_ref().map(|v| json!(v)),
            caption_weight: self.caption_weight.map(|v| json!(v)),
            caption_italic: self.caption_italic.map(|v| json!(v)),
            caption_font: self.caption_font.as_ref().map(|v| json!(v)),
            custom_text: self.custom_text.as_ref().map(|v| json!(v)),
            show_percent: self.show_percent.map(|v| json!(v)),
        }
    }
}

#[cfg(feature = "server")]
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub addr: String,
    /// Worker threads; defaults to the number of CPUs
    #[arg(long)]
    pub workers: Option<usize>,
    /// Preferred TTF/OTF file for text
    #[arg(long)]
    pub font: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UrlArgs {
    /// Origin the endpoint is deployed at, e.g. https://example.com
    #[arg(long)]
    pub base: String,
    /// Phone preset label (or part of it)
    #[arg(long)]
    pub device: Option<String>,
    /// days, weeks or months
    #[arg(long, default_value = "days")]
    pub style: String,
    #[arg(long = "cell-size")]
    pub cell_size: Option<u32>,
    #[arg(long)]
    pub gap: Option<u32>,
    #[arg(long)]
    pub radius: Option<u32>,
    /// Dot size in percent of the cell
    #[arg(long = "dot-scale")]
    pub dot_scale: Option<u32>,
    /// circle or square
    #[arg(long)]
    pub shape: Option<String>,
    #[arg(long)]
    pub columns: Option<u32>,
    #[arg(long)]
    pub bg0: Option<String>,
    #[arg(long)]
    pub bg1: Option<String>,
    #[arg(long)]
    pub past: Option<String>,
    #[arg(long)]
    pub current: Option<String>,
    #[arg(long)]
    pub future: Option<String>,
    #[arg(long = "future-opacity")]
    pub future_opacity: Option<u32>,
    #[arg(long = "custom-text")]
    pub custom_text: Option<String>,
    /// Leave the percentage label off
    #[arg(long = "no-percent")]
    pub no_percent: bool,
}

impl UrlArgs {
    pub fn share_link(&self) -> Result<ShareLink> {
        let mut link = match &self.device {
            Some(name) => ShareLink::for_device(
                devices::find_phone(name).ok_or_else(|| anyhow!("unknown device {:?}", name))?,
            ),
            None => ShareLink::default(),
        };
        let style = match self.style.as_str() {
            "days" | "weeks" | "months" => ProgressStyle::from_query(Some(&self.style)),
            other => return Err(anyhow!("style must be days, weeks or months, not {:?}", other)),
        };
        link = link.with_style(style);

        if let Some(v) = self.cell_size {
            link.cell_size = v;
        }
        if let Some(v) = self.gap {
            link.gap = v;
        }
        if let Some(v) = self.radius {
            link.radius = v;
        }
        if let Some(v) = self.dot_scale {
            link.dot_scale_percent = v;
        }
        if let Some(v) = &self.shape {
            link.shape = Shape::parse_or_default(v);
        }
        if let Some(v) = self.columns {
            link.columns = v;
        }
        for (slot, value) in [
            (&mut link.bg0, &self.bg0),
            (&mut link.bg1, &self.bg1),
            (&mut link.past, &self.past),
            (&mut link.current, &self.current),
            (&mut link.future, &self.future),
            (&mut link.custom_text, &self.custom_text),
        ] {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        if let Some(v) = self.future_opacity {
            link.future_opacity = v;
        }
        link.show_percent = !self.no_percent;
        Ok(link)
    }
}

/// `"<w>x<h>"`, followed by the phone model with that screen when one is
/// known.
pub fn describe_target(config: &RenderConfig) -> String {
    let size = format!("{}x{}", config.width, config.height);
    match devices::match_resolution(config.width, config.height) {
        Some(phone) => format!("{} ({})", size, phone.label),
        None => size,
    }
}
