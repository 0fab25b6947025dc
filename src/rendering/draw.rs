//! The wallpaper renderer
//!
//! A single pass over a [`RenderConfig`]: background gradient, one dot per
//! cell, then the optional percentage and caption overlays.

use chrono::{DateTime, Utc};

use super::layout::{round_half_up, CellState, DotGeometry, GridLayout, Progress};
use super::{FontSpec, LinearGradient, Paint, Surface, TextAlign};
use crate::options::{RenderConfig, Shape};

/// Draw the wallpaper described by `config` onto `surface`.
///
/// `now` anchors life-mode week counting; it is not read from the clock.
pub fn draw_wallpaper<S: Surface + ?Sized>(
    surface: &mut S,
    config: &RenderConfig,
    now: DateTime<Utc>,
) {
    let w = config.width as f32;
    let h = config.height as f32;

    surface.set_fill(Paint::Linear(LinearGradient {
        x0: 0.0,
        y0: 0.0,
        x1: w,
        y1: h,
        from: config.bg0,
        to: config.bg1,
    }));
    surface.fill_rect(0.0, 0.0, w, h);

    let progress = Progress::resolve(config, now);
    let grid = GridLayout::compute(config, progress.total);
    let dot = DotGeometry::for_config(config);
    log::debug!(
        "grid {}x{} cells={} current={} origin=({}, {}) dot={}",
        grid.columns,
        grid.rows,
        progress.total,
        progress.current,
        grid.start_x,
        grid.start_y,
        dot.inner
    );

    surface.save();
    for i in 0..progress.total {
        let color = match progress.classify(i) {
            CellState::Past => config.past_color,
            CellState::Current => config.current_color,
            CellState::Future => config.future_color,
        };
        surface.set_fill(Paint::Solid(color));

        let (cell_x, cell_y) = grid.cell_origin(i);
        let x = (cell_x + dot.offset) as f32;
        let y = (cell_y + dot.offset) as f32;
        let inner = dot.inner as f32;
        match config.shape {
            Shape::Circle => {
                let r = inner / 2.0;
                surface.begin_path();
                surface.arc(x + r, y + r, r, 0.0, std::f32::consts::TAU);
                surface.fill();
            }
            Shape::Square => {
                rounded_rect(surface, x, y, inner, inner, dot.corner_radius as f32);
                surface.fill();
            }
        }
    }
    surface.restore();

    if config.show_percent {
        if let Some(label) = progress.label(&config.custom_text) {
            let size = 14.max(round_half_up(config.width as f64 * 0.02));
            let offset = 24.max(round_half_up(config.height as f64 * 0.03));
            surface.set_fill(Paint::Solid(config.caption_color));
            surface.set_text_align(TextAlign::Right);
            surface.set_font(&caption_font(config, size));
            surface.fill_text(
                &label,
                grid.right() as f32,
                (grid.bottom() + offset) as f32,
            );
        }
    }

    if !config.caption.is_empty() {
        let size = 18.max(round_half_up(config.width as f64 * 0.03));
        let offset = 32.max(round_half_up(config.height as f64 * 0.05));
        let y = (config.height as i64 - 40).min(grid.bottom() + offset);
        surface.set_fill(Paint::Solid(config.caption_color));
        surface.set_text_align(TextAlign::Center);
        surface.set_font(&caption_font(config, size));
        surface.fill_text(&config.caption, w / 2.0, y as f32);
    }
}

fn caption_font(config: &RenderConfig, size: i64) -> FontSpec {
    FontSpec::new(
        config.caption_italic,
        config.caption_weight,
        size as f32,
        config.caption_font.clone(),
    )
}

/// Begin a new path tracing a rounded rectangle.
///
/// The radius is clamped to half the shorter side. Corners are quadratic
/// curves with the rectangle corner as control point, not circular arcs.
pub fn rounded_rect<S: Surface + ?Sized>(surface: &mut S, x: f32, y: f32, w: f32, h: f32, r: f32) {
    let r = r.min(w.min(h) / 2.0);
    surface.begin_path();
    surface.move_to(x + r, y);
    surface.line_to(x + w - r, y);
    surface.quad_to(x + w, y, x + w, y + r);
    surface.line_to(x + w, y + h - r);
    surface.quad_to(x + w, y + h, x + w - r, y + h);
    surface.line_to(x + r, y + h);
    surface.quad_to(x, y + h, x, y + h - r);
    surface.line_to(x, y + r);
    surface.quad_to(x, y, x + r, y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_date;
    use crate::color::Color;
    use crate::options::Mode;
    use crate::rendering::paint::{DrawCommand, PathSegment, RecordingSurface};

    fn now() -> DateTime<Utc> {
        parse_date("2026-10-18T09:00:00Z").unwrap()
    }

    #[test]
    fn rounded_rect_traces_quadratic_corners() {
        let mut s = RecordingSurface::new();
        rounded_rect(&mut s, 10.0, 20.0, 8.0, 8.0, 10.0);
        s.fill();
        let DrawCommand::FillPath { segments, .. } = &s.commands()[0] else {
            panic!("expected a path");
        };
        assert_eq!(segments.len(), 9);
        assert_eq!(segments[0], PathSegment::MoveTo { x: 14.0, y: 20.0 });
        assert_eq!(
            segments[2],
            PathSegment::QuadTo { cx: 18.0, cy: 20.0, x: 18.0, y: 24.0 }
        );
        assert_eq!(
            segments[8],
            PathSegment::QuadTo { cx: 10.0, cy: 20.0, x: 14.0, y: 20.0 }
        );
    }

    #[test]
    fn background_is_a_diagonal_gradient() {
        let cfg = RenderConfig::default();
        let mut s = RecordingSurface::new();
        draw_wallpaper(&mut s, &cfg, now());
        match &s.commands()[0] {
            DrawCommand::FillRect { x, y, width, height, paint } => {
                assert_eq!((*x, *y, *width, *height), (0.0, 0.0, 1920.0, 1080.0));
                assert_eq!(
                    *paint,
                    Paint::Linear(LinearGradient {
                        x0: 0.0,
                        y0: 0.0,
                        x1: 1920.0,
                        y1: 1080.0,
                        from: cfg.bg0,
                        to: cfg.bg1,
                    })
                );
            }
            other => panic!("unexpected first command {:?}", other),
        }
    }

    #[test]
    fn custom_mode_without_units_draws_no_cells() {
        let cfg = RenderConfig {
            mode: Mode::Custom,
            units: None,
            ..RenderConfig::default()
        };
        let mut s = RecordingSurface::new();
        draw_wallpaper(&mut s, &cfg, now());
        assert_eq!(s.paths().count(), 0);
        // caption only; no percentage without a current cell
        assert_eq!(s.texts().count(), 1);
    }

    #[test]
    fn caption_stays_above_bottom_edge() {
        let cfg = RenderConfig {
            mode: Mode::Custom,
            units: Some(400),
            columns: 10,
            cell_size: 64,
            height: 400,
            ..RenderConfig::default()
        };
        let mut s = RecordingSurface::new();
        draw_wallpaper(&mut s, &cfg, now());
        let caption = s
            .texts()
            .find_map(|c| match c {
                DrawCommand::FillText { text, y, align, .. } if text == "My Life in Weeks" => {
                    Some((*y, *align))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(caption, (360.0, TextAlign::Center));
    }

    #[test]
    fn circles_use_inner_diameter() {
        let cfg = RenderConfig {
            mode: Mode::Custom,
            units: Some(3),
            shape: Shape::Circle,
            cell_size: 20,
            dot_scale: 0.5,
            past_color: Color::rgb(1, 1, 1),
            ..RenderConfig::default()
        };
        let mut s = RecordingSurface::new();
        draw_wallpaper(&mut s, &cfg, now());
        for cmd in s.paths() {
            let DrawCommand::FillPath { segments, .. } = cmd else { unreachable!() };
            match segments.as_slice() {
                [PathSegment::Arc { radius, start, end, .. }] => {
                    assert_eq!(*radius * 2.0, 10.0);
                    assert_eq!(*start, 0.0);
                    assert_eq!(*end, std::f32::consts::TAU);
                }
                other => panic!("unexpected segments {:?}", other),
            }
        }
        assert_eq!(s.paths().count(), 3);
    }
}
