//! Per-column statistics over a loaded table.

use crate::layout::format_tick;
use crate::table::{Column, ColumnTable};
use serde::Serialize;

/// Summary statistics for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    /// Cells that coerced to a number
    pub numeric: usize,
    /// Cells kept as text
    pub text: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl ColumnSummary {
    pub fn from_column(column: &Column) -> Self {
        let numbers: Vec<f64> = column.numbers().collect();
        let (min, max) = match bounds(numbers.iter().copied()) {
            Some((lo, hi)) => (Some(lo), Some(hi)),
            None => (None, None),
        };
        Self {
            name: column.name.clone(),
            numeric: numbers.len(),
            text: column.values.len() - numbers.len(),
            min,
            max,
            mean: avg(&numbers),
        }
    }
}

/// Summarize every column in table order
pub fn summarize(table: &ColumnTable) -> Vec<ColumnSummary> {
    table.columns().iter().map(ColumnSummary::from_column).collect()
}

/// (min, max) of the finite values, `None` when there are none
pub fn bounds<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Render summaries as an aligned text table
pub fn format_summary(summaries: &[ColumnSummary]) -> String {
    let name_width = summaries
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0)
        .max("Column".len());

    let stat = |v: Option<f64>| v.map(format_tick).unwrap_or_else(|| "N/A".to_string());

    let mut out = format!(
        "{:<w$} {:>8} {:>6} {:>14} {:>14} {:>14}\n",
        "Column",
        "Numeric",
        "Text",
        "Min",
        "Max",
        "Mean",
        w = name_width
    );
    out.push_str(&"-".repeat(name_width + 61));
    out.push('\n');
    for s in summaries {
        out.push_str(&format!(
            "{:<w$} {:>8} {:>6} {:>14} {:>14} {:>14}\n",
            s.name,
            s.numeric,
            s.text,
            stat(s.min),
            stat(s.max),
            stat(s.mean),
            w = name_width
        ));
    }
    out
}
