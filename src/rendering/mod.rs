//! Rendering: the drawing-surface seam, grid layout, and output
//!
//! [`draw::draw_wallpaper`] issues canvas-style commands against any
//! [`Surface`]. Two surfaces ship with the crate: [`paint::RecordingSurface`]
//! captures the command stream, and `raster::PixmapSurface` (feature
//! `raster`) paints into a pixmap that is then PNG-encoded.

pub mod draw;
pub mod font;
pub mod layout;
pub mod paint;

#[cfg(feature = "raster")]
pub mod raster;

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::color::Color;
pub use font::FontSpec;
#[cfg(feature = "raster")]
pub use font::{FontBook, FontFace, FONT_ENV};

/// Linear gradient between two colors along `(x0, y0) -> (x1, y1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGradient {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub from: Color,
    pub to: Color,
}

/// Fill style for subsequent fills.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Color),
    Linear(LinearGradient),
}

impl Paint {
    /// A single color standing in for this paint, used where a surface can
    /// only apply flat colors (glyph coverage).
    pub fn flat_color(&self) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Linear(g) => g.to,
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::rgb(0, 0, 0))
    }
}

/// Horizontal anchoring of `fill_text` relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// A 2D drawing surface with canvas-like semantics.
///
/// Paths are built with `begin_path` / `move_to` / `line_to` / `quad_to` /
/// `arc` and painted with `fill`; text is anchored at its alphabetic
/// baseline. `save` / `restore` push and pop the fill, font and alignment
/// state.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);

    fn set_fill(&mut self, paint: Paint);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    /// Quadratic Bézier from the current point via `(cx, cy)` to `(x, y)`.
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    /// Clockwise arc around `(cx, cy)`; angles in radians.
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32);
    fn fill(&mut self);

    fn set_font(&mut self, font: &FontSpec);
    fn set_text_align(&mut self, align: TextAlign);
    fn fill_text(&mut self, text: &str, x: f32, y: f32);
}

/// An encoded wallpaper image.
#[derive(Debug, Clone)]
pub struct Wallpaper {
    /// Layout width in CSS-like pixels
    pub width: u32,
    /// Layout height in CSS-like pixels
    pub height: u32,
    /// Pixel density multiplier applied to the output
    pub scale: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub png_data: Vec<u8>,
}

impl Wallpaper {
    /// `data:image/png;base64,...`
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }

    /// Hex SHA-256 of the PNG bytes.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }

    /// Download name, e.g. `life-wallpaper-1920x1080@2x.png`.
    pub fn file_name(&self) -> String {
        let density = if self.scale > 1.0 {
            format!("@{}x", self.scale)
        } else {
            String::new()
        };
        format!("life-wallpaper-{}x{}{}.png", self.width, self.height, density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallpaper(scale: f64) -> Wallpaper {
        Wallpaper {
            width: 1920,
            height: 1080,
            scale,
            pixel_width: (1920.0 * scale) as u32,
            pixel_height: (1080.0 * scale) as u32,
            png_data: b"\x89PNG".to_vec(),
        }
    }

    #[test]
    fn file_name_mentions_density_only_when_scaled() {
        assert_eq!(wallpaper(1.0).file_name(), "life-wallpaper-1920x1080.png");
        assert_eq!(wallpaper(2.0).file_name(), "life-wallpaper-1920x1080@2x.png");
        assert_eq!(wallpaper(1.5).file_name(), "life-wallpaper-1920x1080@1.5x.png");
    }

    #[test]
    fn data_url_and_digest() {
        let w = wallpaper(1.0);
        assert_eq!(w.data_url(), "data:image/png;base64,iVBORw==");
        assert_eq!(w.sha256_hex().len(), 64);
    }

    #[test]
    fn gradient_paint_flattens_to_end_color() {
        let g = Paint::Linear(LinearGradient {
            x0: 0.0,
            y0: 0.0,
            x1: 1.0,
            y1: 1.0,
            from: Color::rgb(1, 2, 3),
            to: Color::rgb(4, 5, 6),
        });
        assert_eq!(g.flat_color(), Color::rgb(4, 5, 6));
    }
}
