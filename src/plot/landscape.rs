//! Error landscape with the descent paths drawn on top.
//!
//! - one parameter: `log10(E)` as a curve, visited points as coloured paths
//! - two parameters: filled contour of `log10(E)` with a colour bar, paths overlaid
//! - more: nothing is drawn; the caller logs and moves on
//!
//! Exact fits have `log10(E) = -inf`; those values are clamped to the bottom
//! of the scale for fills and skipped for lines.

use std::error::Error;
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

use crate::domain::Trajectory;
use crate::error::AppError;
use crate::plot::context::{RenderContext, pad_range, series_color};
use crate::plot::palette::{CONTOUR_LEVELS, level_color, plasma};
use crate::surface::{ErrorSurface, ErrorSurfaceGrid, finite_range};

/// Width in pixels reserved for the colour bar.
const COLORBAR_WIDTH: u32 = 130;

/// Render `<prefix>_descent_path.png`, or return `None` above two parameters.
pub fn render_descent_path(
    ctx: &RenderContext,
    surface: &ErrorSurface<'_>,
    grid: &ErrorSurfaceGrid,
    trajectories: &[Trajectory],
) -> Result<Option<PathBuf>, AppError> {
    let path = ctx.artifact("descent_path");
    let drawn = match grid {
        ErrorSurfaceGrid::OneParam(points) => draw_curve(ctx, &path, surface, points, trajectories),
        ErrorSurfaceGrid::TwoParam { a, b, error } => {
            draw_contour(ctx, &path, (a, b, error), trajectories)
        }
        ErrorSurfaceGrid::HighDim(_) => return Ok(None),
    };
    drawn.map_err(|e| AppError::render(&path, e))?;
    debug!(path = %path.display(), "rendered descent path");
    Ok(Some(path))
}

fn draw_curve(
    ctx: &RenderContext,
    path: &Path,
    surface: &ErrorSurface<'_>,
    grid: &[(f64, f64)],
    trajectories: &[Trajectory],
) -> Result<(), Box<dyn Error>> {
    let curve: Vec<(f64, f64)> = grid
        .iter()
        .map(|&(a, e)| (a, e.log10()))
        .filter(|p| p.1.is_finite())
        .collect();
    let paths: Vec<Vec<(f64, f64)>> = trajectories
        .iter()
        .map(|t| {
            t.points
                .iter()
                .map(|p| (p[0], surface.log10_error(p)))
                .filter(|p| p.1.is_finite())
                .collect()
        })
        .collect();

    let (x_min, x_max) = pad_range(finite_range(grid.iter().map(|&(a, _)| a)), 0.0);
    let (y_min, y_max) = pad_range(
        finite_range(
            curve
                .iter()
                .chain(paths.iter().flatten())
                .map(|&(_, y)| y),
        ),
        0.05,
    );

    let root = BitMapBackend::new(path, ctx.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&ctx.title, ctx.caption_style())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(ctx.parameter_names[0].as_str())
        .y_desc(&ctx.error_label)
        .draw()?;

    chart.draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))?;

    let labelled = draw_paths(&mut chart, trajectories, &paths, 1)?;
    if labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_contour(
    ctx: &RenderContext,
    path: &Path,
    (a, b, error): (&DMatrix<f64>, &DMatrix<f64>, &DMatrix<f64>),
    trajectories: &[Trajectory],
) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = error.shape();
    let log_error = error.map(f64::log10);
    let (lo, hi) = pad_range(finite_range(log_error.iter().copied()), 0.0);
    let floor = |v: f64| if v.is_finite() { v } else { lo };

    let root = BitMapBackend::new(path, ctx.size).into_drawing_area();
    root.fill(&WHITE)?;
    let (main, bar) = root.split_horizontally(ctx.size.0.saturating_sub(COLORBAR_WIDTH));

    let mut chart = ChartBuilder::on(&main)
        .caption(&ctx.title, ctx.caption_style())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(a[(0, 0)]..a[(0, cols - 1)], b[(0, 0)]..b[(rows - 1, 0)])?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(ctx.parameter_names[0].as_str())
        .y_desc(ctx.parameter_names[1].as_str())
        .draw()?;

    // Each cell is coloured by the mean of its four corner values.
    chart.draw_series((0..rows - 1).flat_map(|row| {
        let log_error = &log_error;
        (0..cols - 1).map(move |col| {
            let mean = (floor(log_error[(row, col)])
                + floor(log_error[(row, col + 1)])
                + floor(log_error[(row + 1, col)])
                + floor(log_error[(row + 1, col + 1)]))
                / 4.0;
            Rectangle::new(
                [
                    (a[(row, col)], b[(row, col)]),
                    (a[(row + 1, col + 1)], b[(row + 1, col + 1)]),
                ],
                level_color(mean, lo, hi).filled(),
            )
        })
    }))?;

    let paths: Vec<Vec<(f64, f64)>> = trajectories
        .iter()
        .map(|t| t.points.iter().map(|p| (p[0], p[1])).collect())
        .collect();
    let labelled = draw_paths(&mut chart, trajectories, &paths, 0)?;
    if labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    draw_colorbar(ctx, &bar, lo, hi)?;
    root.present()?;
    Ok(())
}

/// Overlay each segment as a coloured polyline with markers.
///
/// Returns whether any segment carried a legend label.
fn draw_paths<'a, DB>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    trajectories: &[Trajectory],
    paths: &[Vec<(f64, f64)>],
    color_offset: usize,
) -> Result<bool, Box<dyn Error>>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
{
    let mut labelled = false;
    for (idx, (t, points)) in trajectories.iter().zip(paths).enumerate() {
        let color = series_color(idx + color_offset);
        let anno = chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
        if !t.label.is_empty() {
            labelled = true;
            anno.label(t.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;
    }
    Ok(labelled)
}

fn draw_colorbar<DB>(
    ctx: &RenderContext,
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut bar = ChartBuilder::on(area)
        .margin_top(50)
        .margin_bottom(55)
        .margin_right(10)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(&ctx.error_label)
        .draw()?;

    let band = (hi - lo) / CONTOUR_LEVELS as f64;
    bar.draw_series((0..CONTOUR_LEVELS).map(|level| {
        let t = level as f64 / (CONTOUR_LEVELS - 1) as f64;
        let y0 = lo + band * level as f64;
        Rectangle::new([(0.0, y0), (1.0, y0 + band)], plasma(t).filled())
    }))?;
    Ok(())
}
