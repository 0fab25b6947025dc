//! Grid layout: cell totals, current-cell resolution, and pixel geometry

use chrono::{DateTime, Utc};

use crate::calendar::elapsed_weeks;
use crate::options::{Mode, RenderConfig, WEEKS_PER_YEAR};

/// Round half toward positive infinity (`-0.5 -> 0`, `2.5 -> 3`).
pub fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Classification of a cell relative to the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Past,
    Current,
    Future,
}

/// Resolved cell total and current index for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: u32,
    /// Zero-based current cell, `-1` for none; always `< total`.
    pub current: i64,
}

impl Progress {
    /// Custom mode: `units` cells (none if absent) and the configured index.
    /// Life mode: `years * 52` cells and whole weeks elapsed since `dob`.
    pub fn resolve(config: &RenderConfig, now: DateTime<Utc>) -> Self {
        let (total, current) = match config.mode {
            Mode::Custom => match config.units {
                Some(units) if units > 0 => (units, config.current_index),
                _ => (0, -1),
            },
            Mode::Life => {
                let total = config.years * WEEKS_PER_YEAR;
                let current = config.dob.map_or(-1, |dob| elapsed_weeks(dob, now));
                (total, current)
            }
        };
        let current = if total == 0 {
            -1
        } else {
            current.clamp(-1, total as i64 - 1)
        };
        Self { total, current }
    }

    pub fn classify(&self, index: u32) -> CellState {
        let i = index as i64;
        if self.current < 0 || i > self.current {
            CellState::Future
        } else if i < self.current {
            CellState::Past
        } else {
            CellState::Current
        }
    }

    /// Share of cells up to and including the current one, in whole percent.
    pub fn percent(&self) -> Option<i64> {
        if self.current < 0 || self.total == 0 {
            return None;
        }
        Some(round_half_up(
            (self.current + 1) as f64 / self.total as f64 * 100.0,
        ))
    }

    /// `"<prefix> <percent>%"`, or just `"<percent>%"` for an empty prefix.
    pub fn label(&self, prefix: &str) -> Option<String> {
        let percent = self.percent()?;
        Some(if prefix.is_empty() {
            format!("{}%", percent)
        } else {
            format!("{} {}%", prefix, percent)
        })
    }
}

/// Pixel geometry of the grid, centered inside the margin-inset canvas.
///
/// Values are signed: a grid larger than the available area gets a
/// negative origin and extends past the margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_size: i64,
    pub gap: i64,
    pub grid_width: i64,
    pub grid_height: i64,
    pub start_x: i64,
    pub start_y: i64,
}

impl GridLayout {
    pub fn compute(config: &RenderConfig, total: u32) -> Self {
        let columns = config.columns.max(1);
        let rows = total.div_ceil(columns);
        let cell_size = config.cell_size as i64;
        let gap = config.gap as i64;
        let grid_width = columns as i64 * cell_size + (columns as i64 - 1) * gap;
        let grid_height = rows as i64 * cell_size + (rows as i64 - 1) * gap;
        let margin = config.margin as f64;
        let start_x = round_half_up(
            margin + (config.width as f64 - margin * 2.0 - grid_width as f64) / 2.0,
        );
        let start_y = round_half_up(
            margin + (config.height as f64 - margin * 2.0 - grid_height as f64) / 2.0,
        );
        Self {
            columns,
            rows,
            cell_size,
            gap,
            grid_width,
            grid_height,
            start_x,
            start_y,
        }
    }

    /// Top-left corner of cell `index` (row-major).
    pub fn cell_origin(&self, index: u32) -> (i64, i64) {
        let row = (index / self.columns) as i64;
        let col = (index % self.columns) as i64;
        let pitch = self.cell_size + self.gap;
        (self.start_x + col * pitch, self.start_y + row * pitch)
    }

    pub fn bottom(&self) -> i64 {
        self.start_y + self.grid_height
    }

    pub fn right(&self) -> i64 {
        self.start_x + self.grid_width
    }
}

/// The painted dot inside a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotGeometry {
    /// Edge length (square) or diameter (circle), at least 1.
    pub inner: i64,
    /// Inset from the cell's top-left corner on both axes.
    pub offset: i64,
    /// Square corner radius, never more than half of `inner`.
    pub corner_radius: f64,
}

impl DotGeometry {
    pub fn new(cell_size: u32, dot_scale: f64, radius: u32) -> Self {
        let inner = round_half_up(cell_size as f64 * dot_scale).max(1);
        let offset = round_half_up((cell_size as i64 - inner) as f64 / 2.0);
        let corner_radius = (radius as f64).min(inner as f64 / 2.0);
        Self {
            inner,
            offset,
            corner_radius,
        }
    }

    pub fn for_config(config: &RenderConfig) -> Self {
        Self::new(config.cell_size, config.dot_scale, config.radius)
    }
}
