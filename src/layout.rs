//! Axis and grid bookkeeping for the two chart layouts.
//!
//! Nothing here touches a drawing backend, so placement rules can be checked
//! without rendering.

use num_format::{Locale, ToFormattedString};
use std::ops::Range;

/// Pixel step between successive outward y-axes
pub const AXIS_OFFSET_STEP: u32 = 60;
/// Largest accepted step between outward y-axes
pub const MAX_AXIS_OFFSET: u32 = 1000;
/// Width reserved for one y-axis: line, ticks, tick labels and title
pub const AXIS_AREA_WIDTH: u32 = 70;
/// Default upper bound on grid columns
pub const MAX_GRID_COLUMNS: usize = 3;
/// Grid cell size in pixels
pub const GRID_CELL_SIZE: (u32, u32) = (500, 350);

/// One base axis plus one outward-offset y-axis per series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiAxisLayout {
    offsets: Vec<u32>,
}

impl MultiAxisLayout {
    pub fn new(series_count: usize, step: u32) -> Self {
        Self {
            offsets: (0..series_count)
                .map(|i| u32::try_from(i).unwrap_or(u32::MAX).saturating_mul(step))
                .collect(),
        }
    }

    /// Base axis included
    pub fn axis_count(&self) -> usize {
        1 + self.offsets.len()
    }

    /// Outward offset of each series axis, in series order
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// Right-hand label area wide enough for the outermost axis
    pub fn right_area_width(&self) -> u32 {
        AXIS_AREA_WIDTH.saturating_add(self.offsets.last().copied().unwrap_or(0))
    }
}

/// Row-major grid of subplots, one per series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub used: usize,
}

impl GridLayout {
    /// `None` when there is nothing to lay out
    pub fn new(series_count: usize, max_cols: usize) -> Option<Self> {
        if series_count == 0 || max_cols == 0 {
            return None;
        }
        let cols = series_count.min(max_cols);
        let rows = series_count.div_ceil(cols);
        Some(Self {
            rows,
            cols,
            used: series_count,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Cells left over in the last row; they are dropped from the figure
    pub fn removed_cells(&self) -> Range<usize> {
        self.used..self.cell_count()
    }

    /// (row, col) of a cell index
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// True when no used cell sits directly below `index`
    pub fn shows_x_ticks(&self, index: usize) -> bool {
        index + self.cols >= self.used
    }

    pub fn figure_size(&self, cell: (u32, u32)) -> (u32, u32) {
        (cell.0 * self.cols as u32, cell.1 * self.rows as u32)
    }
}

/// Vertical midpoint of a series, where grid annotations are anchored
pub fn midpoint(min: f64, max: f64) -> f64 {
    min + 0.5 * (max - min)
}

/// Axis range with a 5% margin; flat data gets a unit-sized window
pub fn padded_range(min: f64, max: f64) -> Range<f64> {
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        (min.abs() * 0.05).max(0.5)
    };
    (min - pad)..(max + pad)
}

/// Evenly spaced tick values on 1/2/5 steps covering `range`
pub fn nice_ticks(range: &Range<f64>, target: usize) -> Vec<f64> {
    let span = range.end - range.start;
    if !span.is_finite() || span <= 0.0 || target < 2 {
        return vec![range.start];
    }

    let raw = span / (target - 1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        r if r <= 1.0 => 1.0,
        r if r <= 2.0 => 2.0,
        r if r <= 5.0 => 5.0,
        _ => 10.0,
    } * magnitude;

    let first = (range.start / step).ceil() as i64;
    let last = (range.end / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Tick label text; large whole numbers get thousands separators
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        let whole = value as i64;
        if whole.abs() >= 10_000 {
            return whole.to_formatted_string(&Locale::en);
        }
        return whole.to_string();
    }
    let text = format!("{:.3}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
