//! Paint command capture
//!
//! [`RecordingSurface`] implements [`Surface`] by appending a
//! [`DrawCommand`] per fill, with the fill/font/alignment state resolved at
//! the time of the call. Useful for layout tests and for replaying a render
//! onto another surface.

use super::{FontSpec, Paint, Surface, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    Arc { cx: f32, cy: f32, radius: f32, start: f32, end: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        paint: Paint,
    },
    FillPath {
        segments: Vec<PathSegment>,
        paint: Paint,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        font: String,
        align: TextAlign,
        paint: Paint,
    },
}

impl DrawCommand {
    /// Axis-aligned bounds `(min_x, min_y, max_x, max_y)` of a filled path.
    pub fn path_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let DrawCommand::FillPath { segments, .. } = self else {
            return None;
        };
        let mut points = Vec::new();
        for seg in segments {
            match *seg {
                PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => points.push((x, y)),
                PathSegment::QuadTo { cx, cy, x, y } => {
                    points.push((cx, cy));
                    points.push((x, y));
                }
                PathSegment::Arc { cx, cy, radius, .. } => {
                    points.push((cx - radius, cy - radius));
                    points.push((cx + radius, cy + radius));
                }
            }
        }
        let first = *points.first()?;
        Some(points.iter().fold(
            (first.0, first.1, first.0, first.1),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        ))
    }

    pub fn paint(&self) -> Option<Paint> {
        match self {
            DrawCommand::FillRect { paint, .. }
            | DrawCommand::FillPath { paint, .. }
            | DrawCommand::FillText { paint, .. } => Some(*paint),
            DrawCommand::Save | DrawCommand::Restore => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct DrawState {
    fill: Paint,
    font: FontSpec,
    align: TextAlign,
}

/// A surface that records what would be drawn.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    state: DrawState,
    stack: Vec<DrawState>,
    path: Vec<PathSegment>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Filled paths, in draw order.
    pub fn paths(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath { .. }))
    }

    /// Text draws, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillText { .. }))
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
            self.commands.push(DrawCommand::Restore);
        }
    }

    fn set_fill(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            paint: self.state.fill,
        });
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
        if self.path.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::FillPath {
            segments: self.path.clone(),
            paint: self.state.fill,
        });
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x,
            y,
            font: self.state.font.to_string(),
            align: self.state.align,
            paint: self.state.fill,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn records_resolved_state() {
        let mut s = RecordingSurface::new();
        s.set_fill(Paint::Solid(Color::rgb(255, 0, 0)));
        s.save();
        s.set_fill(Paint::Solid(Color::rgb(0, 255, 0)));
        s.begin_path();
        s.move_to(1.0, 2.0);
        s.line_to(5.0, 2.0);
        s.quad_to(6.0, 2.0, 6.0, 3.0);
        s.fill();
        s.restore();
        s.set_text_align(TextAlign::Center);
        s.fill_text("hi", 10.0, 20.0);

        let cmds = s.commands();
        assert_eq!(cmds.len(), 4);
        assert_eq!(cmds[1].paint(), Some(Paint::Solid(Color::rgb(0, 255, 0))));
        assert_eq!(cmds[1].path_bounds(), Some((1.0, 2.0, 6.0, 3.0)));
        match &cmds[3] {
            DrawCommand::FillText { align, paint, font, .. } => {
                assert_eq!(*align, TextAlign::Center);
                assert_eq!(*paint, Paint::Solid(Color::rgb(255, 0, 0)));
                assert_eq!(font, "normal 400 10px sans-serif");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn empty_path_fill_is_dropped() {
        let mut s = RecordingSurface::new();
        s.begin_path();
        s.fill();
        s.restore();
        assert!(s.commands().is_empty());
    }

    #[test]
    fn arc_bounds_cover_the_disk() {
        let cmd = DrawCommand::FillPath {
            segments: vec![PathSegment::Arc {
                cx: 10.0,
                cy: 10.0,
                radius: 4.0,
                start: 0.0,
                end: std::f32::consts::TAU,
            }],
            paint: Paint::default(),
        };
        assert_eq!(cmd.path_bounds(), Some((6.0, 6.0, 14.0, 14.0)));
    }
}
