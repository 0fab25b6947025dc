//! Lifegrid
//!
//! Renders "life calendar" and progress-grid wallpapers: a grid of dots,
//! one per week of a life (or per day, week or month of a period), colored
//! past / current / future over a gradient background, with an optional
//! percentage label and caption.
//!
//! # Features
//!
//! - **raster** (default): tiny-skia rasterization, fontdb face matching,
//!   ab_glyph text and PNG encoding
//! - **server** (default): the `/api/wallpaper` HTTP endpoint on tiny_http
//!
//! Without `raster` the crate still normalizes options and can drive any
//! [`Surface`] implementation, such as [`RecordingSurface`].
//!
//! # Example
//!
//! ```no_run
//! use lifegrid::{normalize, RawOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = RawOptions::from_json(r#"{ "dob": "1990-05-01", "years": 80 }"#)?;
//! let config = normalize(&raw);
//! let now = chrono::Utc::now();
//! let fonts = lifegrid::FontBook::discover(None)?;
//! let wallpaper = lifegrid::generate_wallpaper(&config, now, Some(&fonts))?;
//! std::fs::write(wallpaper.file_name(), &wallpaper.png_data)?;
//! # Ok(())
//! # }
//! ```

pub mod calendar;
pub mod color;
pub mod devices;
pub mod error;
pub mod options;
pub mod query;
pub mod rendering;

#[cfg(feature = "server")]
pub mod server;

pub use calendar::{ProgressPreset, ProgressStyle};
pub use color::Color;
pub use error::{Error, Result};
pub use options::{normalize, normalize_with, Mode, RawOptions, RenderConfig, Shape};
pub use query::ShareLink;
pub use rendering::draw::draw_wallpaper;
pub use rendering::paint::RecordingSurface;
pub use rendering::{FontSpec, Surface, Wallpaper};

#[cfg(feature = "raster")]
pub use rendering::raster::{generate_wallpaper, PixmapSurface};
#[cfg(feature = "raster")]
pub use rendering::{FontBook, FontFace};

/// Normalize `raw` over the maker profile and render it to PNG.
#[cfg(feature = "raster")]
pub fn generate_life_wallpaper(
    raw: &RawOptions,
    now: chrono::DateTime<chrono::Utc>,
    fonts: Option<&FontBook>,
) -> Result<Wallpaper> {
    generate_wallpaper(&normalize(raw), now, fonts)
}
