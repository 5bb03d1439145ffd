//! iterplot - render per-iteration CSV metrics as line charts.
//!
//! Loads a CSV file of iteration metrics into a column table and draws
//! every selected column either on its own outward-offset y-axis of a
//! single chart, or in a grid of subplots sharing the x-axis.

mod config;
mod layout;
mod plot;
mod series;
mod summary;
mod table;

use anyhow::{Context, Result};
use clap::Parser;
use config::{parse_label, LayoutKind, PlotConfig};
use layout::MAX_AXIS_OFFSET;
use std::path::PathBuf;
use table::TypeMode;

/// Plot iteration metrics from a CSV file
#[derive(Parser, Debug)]
#[command(name = "iterplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to plot [default: out.csv]
    input: Option<PathBuf>,

    /// JSON config file; flags given on the command line override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output SVG file [default: plot.svg]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Chart layout [default: multi-axis]
    #[arg(short, long, value_enum)]
    layout: Option<LayoutKind>,

    /// Column used as the x-axis [default: first column]
    #[arg(short = 'x', long)]
    x_column: Option<String>,

    /// Columns to plot, comma separated [default: every other column]
    #[arg(short = 'y', long, value_delimiter = ',')]
    y_columns: Vec<String>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Display label for a column, as COLUMN=TEXT (repeatable)
    #[arg(long = "label", value_parser = parse_label)]
    labels: Vec<(String, String)>,

    /// Figure width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Figure height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Pixel step between outward y-axes (multi-axis layout)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_AXIS_OFFSET as i64))]
    axis_offset: Option<u32>,

    /// Label each subplot beside its midpoint instead of on the y-axis (grid layout)
    #[arg(long)]
    annotate: bool,

    /// Reject columns that mix numbers and text
    #[arg(long)]
    strict: bool,

    /// Print per-column statistics
    #[arg(long)]
    summary: bool,

    /// Print per-column statistics as JSON on stdout
    #[arg(long)]
    summary_json: bool,

    /// Open the chart in the default viewer once written
    #[arg(long)]
    show: bool,
}

impl Args {
    /// Build the plot config: defaults, then the config file, then flags
    fn to_config(&self) -> Result<PlotConfig> {
        let mut config = match &self.config {
            Some(path) => PlotConfig::from_file(path)?,
            None => PlotConfig::default(),
        };

        if let Some(ref input) = self.input {
            config.input = input.clone();
        }
        if let Some(ref output) = self.output {
            config.output = output.clone();
        }
        if let Some(layout) = self.layout {
            config.layout = layout;
        }
        if let Some(ref x) = self.x_column {
            config.x_column = Some(x.clone());
        }
        if !self.y_columns.is_empty() {
            config.y_columns = self.y_columns.clone();
        }
        if let Some(ref title) = self.title {
            config.title = Some(title.clone());
        }
        for (column, text) in &self.labels {
            config.labels.insert(column.clone(), text.clone());
        }
        if self.width.is_some() {
            config.width = self.width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if let Some(step) = self.axis_offset {
            config.axis_offset = step;
        }
        config.annotate |= self.annotate;
        config.strict_types |= self.strict;

        config.validate()?;
        Ok(config)
    }
}

/// What to report besides the chart itself
#[derive(Debug, Clone, Copy, Default)]
struct Extras {
    summary: bool,
    summary_json: bool,
    show: bool,
}

fn run(config: &PlotConfig, extras: Extras) -> Result<()> {
    let mode = if config.strict_types {
        TypeMode::Strict
    } else {
        TypeMode::Permissive
    };
    let table = table::load_table(&config.input, mode)?;

    if extras.summary || extras.summary_json {
        let summaries = summary::summarize(&table);
        if extras.summary {
            eprintln!("\n{}", summary::format_summary(&summaries));
        }
        if extras.summary_json {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
    }

    let selection = series::select(
        &table,
        config.x_column.as_deref(),
        &config.y_columns,
        &config.labels,
    )?;
    log::info!(
        "Plotting {} series against '{}' ({:?} layout)",
        selection.series.len(),
        selection.x_column,
        config.layout
    );
    for series in selection.series.iter().filter(|s| s.skipped > 0) {
        log::warn!(
            "Series '{}': skipped {} rows with a text cell",
            series.column,
            series.skipped
        );
    }

    let shape = plot::render_svg(&selection, config, &config.output)?;
    log::debug!("Rendered {:?}", shape);
    eprintln!("Wrote chart to {}", config.output.display());

    if extras.show {
        open::that(&config.output)
            .with_context(|| format!("Failed to open {}", config.output.display()))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.to_config()?;

    let extras = Extras {
        summary: args.summary,
        summary_json: args.summary_json,
        show: args.show,
    };

    run(&config, extras)
}
