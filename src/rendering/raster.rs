//! Rasterization onto a tiny-skia pixmap and PNG encoding

use ab_glyph::{point, Font, ScaleFont};
use chrono::{DateTime, Utc};
use png::{BitDepth, ColorType, Compression, Encoder};
use tiny_skia::{
    FillRule, GradientStop, PathBuilder, Pixmap, Point, PremultipliedColorU8, Rect, Shader,
    SpreadMode, Transform,
};

use super::draw::draw_wallpaper;
use super::font::{FontBook, FontFace};
use super::layout::round_half_up;
use super::paint::PathSegment;
use super::{FontSpec, Paint, Surface, TextAlign, Wallpaper};
use crate::color::Color;
use crate::options::RenderConfig;
use crate::{Error, Result};

/// Largest output accepted, in pixels (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 16384 * 16384;

/// Render `config` and encode it as PNG.
///
/// The pixmap is `round(width * scale) x round(height * scale)`. Each text
/// draw resolves its face from `fonts` by family, weight and style; text is
/// skipped (with a warning) when `fonts` is `None` or nothing matches.
pub fn generate_wallpaper(
    config: &RenderConfig,
    now: DateTime<Utc>,
    fonts: Option<&FontBook>,
) -> Result<Wallpaper> {
    let pixel_width = round_half_up(config.width as f64 * config.scale).max(1) as u32;
    let pixel_height = round_half_up(config.height as f64 * config.scale).max(1) as u32;

    let mut surface = PixmapSurface::new(pixel_width, pixel_height, config.scale as f32, fonts)?;
    draw_wallpaper(&mut surface, config, now);
    let png_data = surface.encode_png()?;

    log::debug!(
        "rendered {}x{} @{}x -> {} bytes",
        config.width,
        config.height,
        config.scale,
        png_data.len()
    );

    Ok(Wallpaper {
        width: config.width,
        height: config.height,
        scale: config.scale,
        pixel_width,
        pixel_height,
        png_data,
    })
}

#[derive(Debug, Clone, Default)]
struct RasterState {
    fill: Paint,
    font: FontSpec,
    align: TextAlign,
}

/// A [`Surface`] backed by a tiny-skia [`Pixmap`].
///
/// Layout coordinates are multiplied by `scale` on the way to pixels.
pub struct PixmapSurface<'f> {
    pixmap: Pixmap,
    scale: f32,
    transform: Transform,
    state: RasterState,
    stack: Vec<RasterState>,
    path: Vec<PathSegment>,
    fonts: Option<&'f FontBook>,
    warned_no_font: bool,
}

impl<'f> PixmapSurface<'f> {
    pub fn new(width: u32, height: u32, scale: f32, fonts: Option<&'f FontBook>) -> Result<Self> {
        if width as u64 * height as u64 > MAX_OUTPUT_PIXELS {
            log::warn!("refusing {}x{} output", width, height);
            return Err(Error::SurfaceError(format!(
                "{}x{} exceeds the {} pixel limit",
                width, height, MAX_OUTPUT_PIXELS
            )));
        }
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::SurfaceError(format!("cannot allocate {}x{}", width, height)))?;
        Ok(Self {
            pixmap,
            scale,
            transform: Transform::from_scale(scale, scale),
            state: RasterState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            fonts,
            warned_no_font: false,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA8 rows, top to bottom.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        data
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let rgba = self.to_rgba();
        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(&mut out, self.pixmap.width(), self.pixmap.height());
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            encoder.set_compression(Compression::Default);
            let mut writer = encoder
                .write_header()
                .map_err(|e| Error::EncodeError(e.to_string()))?;
            writer
                .write_image_data(&rgba)
                .map_err(|e| Error::EncodeError(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| Error::EncodeError(e.to_string()))?;
        }
        Ok(out)
    }

    fn skia_paint(&self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        match self.state.fill {
            Paint::Solid(c) => paint.set_color(skia_color(c)),
            Paint::Linear(g) if g.from == g.to => paint.set_color(skia_color(g.from)),
            Paint::Linear(g) => {
                let shader = tiny_skia::LinearGradient::new(
                    Point::from_xy(g.x0, g.y0),
                    Point::from_xy(g.x1, g.y1),
                    vec![
                        GradientStop::new(0.0, skia_color(g.from)),
                        GradientStop::new(1.0, skia_color(g.to)),
                    ],
                    SpreadMode::Pad,
                    Transform::identity(),
                );
                paint.shader = shader.unwrap_or(Shader::SolidColor(skia_color(g.to)));
            }
        }
        paint
    }

    fn build_path(&self) -> Option<tiny_skia::Path> {
        let mut pb = PathBuilder::new();
        let mut has_point = false;
        for seg in &self.path {
            match *seg {
                PathSegment::MoveTo { x, y } => pb.move_to(x, y),
                PathSegment::LineTo { x, y } => {
                    if has_point {
                        pb.line_to(x, y)
                    } else {
                        pb.move_to(x, y)
                    }
                }
                PathSegment::QuadTo { cx, cy, x, y } => {
                    if !has_point {
                        pb.move_to(cx, cy);
                    }
                    pb.quad_to(cx, cy, x, y)
                }
                PathSegment::Arc { cx, cy, radius, start, end } => {
                    push_arc(&mut pb, has_point, cx, cy, radius, start, end)
                }
            }
            has_point = true;
        }
        pb.finish()
    }

    fn draw_glyphs(&mut self, face: &FontFace, text: &str, x: f32, y: f32) {
        let px = self.state.font.size_px * self.scale;
        let scale = face.em_scale(px);
        let scaled = face.font().as_scaled(scale);
        let width = face.measure(text, px);
        let origin_x = x * self.scale;
        let baseline = y * self.scale;
        let mut pen = match self.state.align {
            TextAlign::Left => origin_x,
            TextAlign::Center => origin_x - width / 2.0,
            TextAlign::Right => origin_x - width,
        };

        let color = self.state.fill.flat_color();
        let (pw, ph) = (self.pixmap.width() as i32, self.pixmap.height() as i32);
        let pixels = self.pixmap.pixels_mut();
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                pen += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scale, point(pen, baseline));
            if let Some(outlined) = face.font().outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px >= 0 && py >= 0 && px < pw && py < ph {
                        let idx = (py * pw + px) as usize;
                        pixels[idx] = blend(pixels[idx], color, coverage);
                    }
                });
            }
            pen += scaled.h_advance(id);
            prev = Some(id);
        }
    }
}

impl Surface for PixmapSurface<'_> {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_fill(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let paint = self.skia_paint();
        self.pixmap.fill_rect(rect, &paint, self.transform, None);
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(PathSegment::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.push(PathSegment::LineTo { x, y });
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.path.push(PathSegment::QuadTo { cx, cy, x, y });
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        self.path.push(PathSegment::Arc {
            cx,
            cy,
            radius,
            start,
            end,
        });
    }

    fn fill(&mut self) {
        let Some(path) = self.build_path() else {
            return;
        };
        let paint = self.skia_paint();
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.transform, None);
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        let face = self.fonts.and_then(|fonts| fonts.resolve(&self.state.font));
        let Some(face) = face else {
            if !self.warned_no_font {
                log::warn!("no font face for {}; skipping text {:?}", self.state.font, text);
                self.warned_no_font = true;
            }
            return;
        };
        self.draw_glyphs(&face, text, x, y);
    }
}

fn skia_color(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.alpha_u8())
}

/// Append an arc; a full turn becomes a closed circle, anything shorter is
/// flattened into line segments joined to the current point.
fn push_arc(pb: &mut PathBuilder, has_point: bool, cx: f32, cy: f32, r: f32, start: f32, end: f32) {
    let sweep = end - start;
    if sweep.abs() >= std::f32::consts::TAU - 1e-4 {
        pb.push_circle(cx, cy, r);
        return;
    }
    let steps = ((sweep.abs() / (std::f32::consts::PI / 32.0)).ceil() as usize).max(1);
    for i in 0..=steps {
        let t = start + sweep * i as f32 / steps as f32;
        let (x, y) = (cx + r * t.cos(), cy + r * t.sin());
        if i == 0 && !has_point {
            pb.move_to(x, y);
        } else {
            pb.line_to(x, y);
        }
    }
}

/// Source-over of `color` at `coverage` onto a premultiplied pixel.
fn blend(dst: PremultipliedColorU8, color: Color, coverage: f32) -> PremultipliedColorU8 {
    let a = color.a * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return dst;
    }
    let inv = 1.0 - a;
    let out_a = (a * 255.0 + dst.alpha() as f32 * inv).round().clamp(0.0, 255.0) as u8;
    let channel = |src: u8, d: u8| -> u8 {
        ((src as f32 * a + d as f32 * inv).round().clamp(0.0, 255.0) as u8).min(out_a)
    };
    PremultipliedColorU8::from_rgba(
        channel(color.r, dst.red()),
        channel(color.g, dst.green()),
        channel(color.b, dst.blue()),
        out_a,
    )
    .unwrap_or(dst)
}
