//! Plot configuration: defaults, JSON config files and CLI overrides.

use crate::layout::{AXIS_OFFSET_STEP, MAX_AXIS_OFFSET, MAX_GRID_COLUMNS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Chart layout variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    /// One plot area with an outward-offset y-axis per series
    #[default]
    MultiAxis,
    /// Grid of subplots sharing the x-axis
    Grid,
}

/// Everything needed to turn one CSV file into one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlotConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub layout: LayoutKind,
    /// First column when unset
    pub x_column: Option<String>,
    /// Every column but x when empty
    pub y_columns: Vec<String>,
    pub title: Option<String>,
    /// Display labels keyed by column name
    pub labels: BTreeMap<String, String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Grid mode: text label beside each subplot instead of a y-axis label
    pub annotate: bool,
    pub strict_types: bool,
    pub axis_offset: u32,
    pub max_grid_columns: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("out.csv"),
            output: PathBuf::from("plot.svg"),
            layout: LayoutKind::MultiAxis,
            x_column: None,
            y_columns: Vec::new(),
            title: None,
            labels: BTreeMap::new(),
            width: None,
            height: None,
            annotate: false,
            strict_types: false,
            axis_offset: AXIS_OFFSET_STEP,
            max_grid_columns: MAX_GRID_COLUMNS,
        }
    }
}

impl PlotConfig {
    /// Read a JSON config file; absent keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    /// Reject values the layouts cannot place
    pub fn validate(&self) -> Result<()> {
        if self.axis_offset > MAX_AXIS_OFFSET {
            bail!(
                "axis-offset must be at most {} pixels, got {}",
                MAX_AXIS_OFFSET,
                self.axis_offset
            );
        }
        if self.max_grid_columns == 0 {
            bail!("max-grid-columns must be at least 1");
        }
        Ok(())
    }

    /// Title used when none is configured
    pub fn title_for(&self, x_label: &str, y_labels: &[&str]) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("{} vs {}", x_label, y_labels.join(", ")),
        }
    }
}

/// Split a `COLUMN=TEXT` label override
pub fn parse_label(s: &str) -> Result<(String, String), String> {
    let (column, text) = s
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=TEXT, got '{}'", s))?;
    if column.is_empty() {
        return Err(format!("empty column name in '{}'", s));
    }
    Ok((column.to_string(), text.to_string()))
}
