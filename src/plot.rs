//! Chart rendering for the multi-axis and subplot-grid layouts.

use crate::config::{LayoutKind, PlotConfig};
use crate::layout::{self, GridLayout, MultiAxisLayout, AXIS_AREA_WIDTH, GRID_CELL_SIZE};
use crate::series::{LineStyle, Marker, Selection, Series, SeriesError, SeriesStyle};
use anyhow::{anyhow, Context, Result};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const MULTI_AXIS_SIZE: (u32, u32) = (1200, 600);
const MARGIN: u32 = 10;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 60;
const ANNOTATION_AREA: u32 = 120;
const TICK_COUNT: usize = 6;
const TITLE_FONT: (&str, u32) = ("sans-serif", 24);

/// What was drawn, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartShape {
    /// Base axis included
    MultiAxis { axes: usize },
    Grid { rows: usize, cols: usize, removed: usize },
}

/// Pixel size of the figure; explicit width/height win over the layout default
pub fn figure_size(config: &PlotConfig, series_count: usize) -> (u32, u32) {
    let (width, height) = match config.layout {
        LayoutKind::MultiAxis => {
            let axes = MultiAxisLayout::new(series_count, config.axis_offset);
            (
                (MULTI_AXIS_SIZE.0 - AXIS_AREA_WIDTH).saturating_add(axes.right_area_width()),
                MULTI_AXIS_SIZE.1,
            )
        }
        LayoutKind::Grid => GridLayout::new(series_count, config.max_grid_columns)
            .map(|grid| grid.figure_size(GRID_CELL_SIZE))
            .unwrap_or(GRID_CELL_SIZE),
    };
    (config.width.unwrap_or(width), config.height.unwrap_or(height))
}

/// Render the selection to an SVG file
pub fn render_svg<P: AsRef<Path>>(
    selection: &Selection,
    config: &PlotConfig,
    path: P,
) -> Result<ChartShape> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let size = figure_size(config, selection.series.len());
    let root = SVGBackend::new(path, size).into_drawing_area();
    let shape = render(&root, selection, config)?;
    root.present()
        .with_context(|| format!("Failed to write chart: {}", path.display()))?;
    Ok(shape)
}

/// Render the selection onto any drawing area
pub fn render<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    selection: &Selection,
    config: &PlotConfig,
) -> Result<ChartShape>
where
    DB::ErrorType: 'static,
{
    if selection.series.is_empty() {
        return Err(SeriesError::NoSeries.into());
    }
    root.fill(&WHITE)?;

    let labels: Vec<&str> = selection.series.iter().map(|s| s.label.as_str()).collect();
    let title = config.title_for(&selection.x_label, &labels);

    match config.layout {
        LayoutKind::MultiAxis => draw_multi_axis(root, selection, &title, config.axis_offset),
        LayoutKind::Grid => draw_grid(
            root,
            selection,
            &title,
            config.max_grid_columns,
            config.annotate,
        ),
    }
}

/// One plot area, one independently scaled y-axis per series
fn draw_multi_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    selection: &Selection,
    title: &str,
    step: u32,
) -> Result<ChartShape>
where
    DB::ErrorType: 'static,
{
    let axes = MultiAxisLayout::new(selection.series.len(), step);
    let right_area = axes.right_area_width();
    let body = root.titled(title, TITLE_FONT)?;

    let (x_min, x_max) = selection.x_bounds();
    let x_range = layout::padded_range(x_min, x_max);

    // Every chart below is built with the same margins on the same area, so
    // they share one plotting rectangle and one x mapping.
    let mut base = ChartBuilder::on(&body)
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .right_y_label_area_size(right_area)
        .build_cartesian_2d(x_range.clone(), 0f64..1f64)?;

    base.configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_labels(10)
        .x_label_formatter(&|v| layout::format_tick(*v))
        .x_desc(selection.x_label.as_str())
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(TRANSPARENT)
        .draw()?;

    for (index, (series, offset)) in selection.series.iter().zip(axes.offsets()).enumerate() {
        let style = SeriesStyle::multi_axis(index);
        let (lo, hi) = series.y_bounds();
        let y_range = layout::padded_range(lo, hi);

        let mut chart = ChartBuilder::on(&body)
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .right_y_label_area_size(right_area)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        draw_line(&mut chart, series, style)?;
        draw_offset_axis(root, &chart, &series.label, &y_range, *offset, style.color)?;
        log::debug!("Axis '{}' at offset {}px, range {:?}", series.label, offset, y_range);
    }

    // Merge every axis' legend entry into one legend on the base axis
    for (index, series) in selection.series.iter().enumerate() {
        let style = SeriesStyle::multi_axis(index);
        let stroke = style.color.stroke_width(2);
        let fill = style.color.filled();
        let [first, second] = legend_dashes(style.line);
        let line = move |at: (i32, i32)| {
            EmptyElement::<_, DB>::at(at)
                + PathElement::new(vec![(first.0, 0), (first.1, 0)], stroke)
                + PathElement::new(vec![(second.0, 0), (second.1, 0)], stroke)
        };

        let entry = base.draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?;
        entry.label(series.label.as_str());
        match style.marker {
            Marker::Circle => {
                entry.legend(move |at| line(at) + Circle::new((10, 0), 3, fill));
            }
            Marker::Square => {
                entry.legend(move |at| line(at) + Rectangle::new([(7, -3), (13, 3)], fill));
            }
            Marker::Triangle => {
                entry.legend(move |at| line(at) + TriangleMarker::new((10, 0), 4, fill));
            }
        }
    }
    base.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(ChartShape::MultiAxis {
        axes: axes.axis_count(),
    })
}

/// Draw a y-axis `offset` pixels outside the right edge of the plotting area
fn draw_offset_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &Chart<'_, DB>,
    label: &str,
    y_range: &Range<f64>,
    offset: u32,
    color: RGBColor,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
    let x_anchor = chart.x_range().start;
    let offset = i32::try_from(offset).unwrap_or(i32::MAX);
    // Ticks and the axis title sit up to AXIS_AREA_WIDTH right of the line
    let axis_x = x_pixels
        .end
        .saturating_add(offset)
        .min(i32::MAX - AXIS_AREA_WIDTH as i32);
    let stroke = color.stroke_width(1);

    root.draw(&PathElement::new(
        vec![(axis_x, y_pixels.start), (axis_x, y_pixels.end)],
        stroke,
    ))?;

    let tick_font = ("sans-serif", 12)
        .into_font()
        .color(&color)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in layout::nice_ticks(y_range, TICK_COUNT) {
        let (_, y) = chart.backend_coord(&(x_anchor, tick));
        root.draw(&PathElement::new(vec![(axis_x, y), (axis_x + 5, y)], stroke))?;
        root.draw(&Text::new(
            layout::format_tick(tick),
            (axis_x + 8, y),
            tick_font.clone(),
        ))?;
    }

    let title_font = ("sans-serif", 14)
        .into_font()
        .transform(FontTransform::Rotate90)
        .color(&color)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw(&Text::new(
        label.to_string(),
        (axis_x + 56, (y_pixels.start + y_pixels.end) / 2),
        title_font,
    ))?;

    Ok(())
}

/// Row-major grid of subplots sharing the x-range
fn draw_grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    selection: &Selection,
    title: &str,
    max_cols: usize,
    annotate: bool,
) -> Result<ChartShape>
where
    DB::ErrorType: 'static,
{
    // Series were checked non-empty by `render`
    let grid = GridLayout::new(selection.series.len(), max_cols)
        .ok_or_else(|| anyhow!("max-grid-columns must be at least 1"))?;
    let body = root.titled(title, TITLE_FONT)?;
    let cells = body.split_evenly((grid.rows, grid.cols));

    let (x_min, x_max) = selection.x_bounds();
    let x_range = layout::padded_range(x_min, x_max);
    let last = grid.used - 1;
    let right_area = if annotate { ANNOTATION_AREA } else { MARGIN };

    // Cells past `grid.used` are left untouched: no frame, no axes
    for (index, (series, cell)) in selection.series.iter().zip(&cells).enumerate() {
        let style = SeriesStyle::grid(index);
        let (row, col) = grid.position(index);
        log::debug!("Cell ({}, {}): '{}'", row, col, series.label);
        let (lo, hi) = series.y_bounds();
        let y_range = layout::padded_range(lo, hi);

        let mut chart = ChartBuilder::on(cell)
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA)
            .right_y_label_area_size(right_area)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let show_x = grid.shows_x_ticks(index);
        let x_fmt = move |v: &f64| {
            if show_x {
                layout::format_tick(*v)
            } else {
                String::new()
            }
        };
        let y_fmt = |v: &f64| layout::format_tick(*v);
        {
            let mut mesh = chart.configure_mesh();
            mesh.x_labels(6)
                .y_labels(TICK_COUNT)
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .y_label_style(("sans-serif", 12).into_font().color(&style.color))
                .bold_line_style(BLACK.mix(0.15))
                .light_line_style(TRANSPARENT);
            if !annotate {
                mesh.y_desc(series.label.as_str())
                    .axis_desc_style(("sans-serif", 14).into_font().color(&style.color));
            }
            if index == last {
                mesh.x_desc(selection.x_label.as_str());
            }
            mesh.draw()?;
        }

        draw_line(&mut chart, series, style)?;

        if annotate {
            let mid = layout::midpoint(lo, hi);
            let (x, y) = chart.backend_coord(&(x_range.end, mid));
            root.draw(&Text::new(
                series.label.clone(),
                (x + 6, y),
                ("sans-serif", 14)
                    .into_font()
                    .color(&style.color)
                    .pos(Pos::new(HPos::Left, VPos::Center)),
            ))?;
        }
    }

    log::debug!(
        "Grid {}x{} with {} removed cells",
        grid.rows,
        grid.cols,
        grid.removed_cells().len()
    );
    Ok(ChartShape::Grid {
        rows: grid.rows,
        cols: grid.cols,
        removed: grid.removed_cells().len(),
    })
}

/// Two segments spanning a 20px legend sample in the series' line style
fn legend_dashes(line: LineStyle) -> [(i32, i32); 2] {
    match line {
        LineStyle::Solid => [(0, 10), (10, 20)],
        LineStyle::Dashed => [(0, 8), (13, 20)],
        LineStyle::DashDot => [(0, 10), (13, 20)],
    }
}

/// Draw a series as a line with point markers
fn draw_line<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, series: &Series, style: SeriesStyle) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let stroke = style.color.stroke_width(2);
    let points = series.points.iter().copied();

    match style.line {
        LineStyle::Solid => {
            chart.draw_series(LineSeries::new(points.clone(), stroke))?;
        }
        LineStyle::Dashed => {
            chart.draw_series(DashedLineSeries::new(points.clone(), 8, 5, stroke))?;
        }
        LineStyle::DashDot => {
            chart.draw_series(DashedLineSeries::new(points.clone(), 10, 3, stroke))?;
        }
    }

    let fill = style.color.filled();
    match style.marker {
        Marker::Circle => {
            chart.draw_series(points.map(|p| Circle::new(p, 3, fill)))?;
        }
        Marker::Square => {
            chart.draw_series(points.map(|p| EmptyElement::at(p) + Rectangle::new([(-3, -3), (3, 3)], fill)))?;
        }
        Marker::Triangle => {
            chart.draw_series(points.map(|p| TriangleMarker::new(p, 4, fill)))?;
        }
    }

    Ok(())
}
