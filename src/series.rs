//! Series derivation: column selection, point extraction and styling.

use crate::summary::bounds;
use crate::table::ColumnTable;
use plotters::style::RGBColor;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SeriesError {
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
    #[error("No y-columns to plot")]
    NoSeries,
    #[error("Column '{0}' has no rows where both x and y are numeric")]
    NoPoints(String),
}

/// Matplotlib's "tab10" cycle
pub const TAB10: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    pub marker: Marker,
    pub line: LineStyle,
}

impl SeriesStyle {
    /// Style for the i-th axis of a multi-axis chart
    pub fn multi_axis(index: usize) -> Self {
        const MARKERS: [Marker; 4] = [Marker::Circle, Marker::Square, Marker::Square, Marker::Triangle];
        const LINES: [LineStyle; 4] = [
            LineStyle::Solid,
            LineStyle::Dashed,
            LineStyle::Dashed,
            LineStyle::DashDot,
        ];
        Self {
            color: TAB10[index % TAB10.len()],
            marker: MARKERS[index % MARKERS.len()],
            line: LINES[index % LINES.len()],
        }
    }

    /// Style for the i-th subplot of a grid
    pub fn grid(index: usize) -> Self {
        Self {
            color: TAB10[index % TAB10.len()],
            marker: Marker::Circle,
            line: LineStyle::Solid,
        }
    }
}

/// One y-column paired against the x-column
#[derive(Debug, Clone)]
pub struct Series {
    pub column: String,
    pub label: String,
    pub points: Vec<(f64, f64)>,
    /// Rows dropped because x or y was text
    pub skipped: usize,
}

impl Series {
    /// (min, max) over the y values
    pub fn y_bounds(&self) -> (f64, f64) {
        bounds(self.points.iter().map(|p| p.1)).unwrap_or((0.0, 0.0))
    }
}

/// Resolved x-column and series, ready to lay out
#[derive(Debug, Clone)]
pub struct Selection {
    pub x_column: String,
    pub x_label: String,
    pub series: Vec<Series>,
}

impl Selection {
    /// Shared x-range across every series
    pub fn x_bounds(&self) -> (f64, f64) {
        bounds(self.series.iter().flat_map(|s| s.points.iter().map(|p| p.0))).unwrap_or((0.0, 0.0))
    }
}

/// Pick the x-column (first column by default) and y-columns (all the
/// others by default) and extract numeric points for each series.
pub fn select(
    table: &ColumnTable,
    x_column: Option<&str>,
    y_columns: &[String],
    labels: &BTreeMap<String, String>,
) -> Result<Selection, SeriesError> {
    let x_name = match x_column {
        Some(name) => name.to_string(),
        None => table.names().next().ok_or(SeriesError::NoSeries)?.to_string(),
    };
    let x = table
        .column(&x_name)
        .ok_or_else(|| SeriesError::UnknownColumn(x_name.clone()))?;

    let y_names: Vec<String> = if y_columns.is_empty() {
        table.names().filter(|n| *n != x_name).map(str::to_string).collect()
    } else {
        y_columns.to_vec()
    };
    if y_names.is_empty() {
        return Err(SeriesError::NoSeries);
    }

    let label_for = |name: &str| labels.get(name).cloned().unwrap_or_else(|| name.to_string());

    let mut series = Vec::with_capacity(y_names.len());
    for name in y_names {
        let y = table
            .column(&name)
            .ok_or_else(|| SeriesError::UnknownColumn(name.clone()))?;

        let mut points = Vec::with_capacity(y.values.len());
        let mut skipped = 0;
        for (xv, yv) in x.values.iter().zip(&y.values) {
            match (xv.as_f64(), yv.as_f64()) {
                (Some(px), Some(py)) => points.push((px, py)),
                _ => skipped += 1,
            }
        }

        if points.is_empty() {
            return Err(SeriesError::NoPoints(name));
        }

        series.push(Series {
            label: label_for(&name),
            column: name,
            points,
            skipped,
        });
    }

    Ok(Selection {
        x_label: label_for(&x_name),
        x_column: x_name,
        series,
    })
}
