//! Error-decrease step plot.
//!
//! Segments share their boundary step: the last point of one segment and the
//! first point of the next sit at the same x position, so `m` then `k` points
//! occupy `m + k - 1` steps.

use std::error::Error;
use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use crate::domain::Trajectory;
use crate::error::AppError;
use crate::plot::context::{RenderContext, pad_range, series_color};
use crate::surface::{ErrorSurface, finite_range};

/// One labelled run of `(step, log10 error)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Step ranges for consecutive segments of the given lengths.
pub fn step_ranges(lengths: &[usize]) -> Vec<Range<usize>> {
    let mut start = 0;
    lengths
        .iter()
        .map(|&len| {
            let range = start..start + len;
            start += len.saturating_sub(1);
            range
        })
        .collect()
}

/// `log10` error of every visited point, placed on the shared step axis.
pub fn step_series(surface: &ErrorSurface<'_>, trajectories: &[Trajectory]) -> Vec<StepSeries> {
    let lengths: Vec<usize> = trajectories.iter().map(Trajectory::len).collect();
    trajectories
        .iter()
        .zip(step_ranges(&lengths))
        .map(|(t, steps)| StepSeries {
            label: t.label.clone(),
            points: steps
                .zip(surface.log10_errors(t))
                .map(|(step, err)| (step as f64, err))
                .collect(),
        })
        .collect()
}

/// Render `<prefix>_error_decrease.png`.
pub fn render_error_decrease(
    ctx: &RenderContext,
    surface: &ErrorSurface<'_>,
    trajectories: &[Trajectory],
) -> Result<PathBuf, AppError> {
    let path = ctx.artifact("error_decrease");
    let series = step_series(surface, trajectories);
    draw_steps(ctx, &path, &series).map_err(|e| AppError::render(&path, e))?;
    debug!(path = %path.display(), segments = series.len(), "rendered error decrease");
    Ok(path)
}

fn draw_steps(ctx: &RenderContext, path: &Path, series: &[StepSeries]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, ctx.size).into_drawing_area();
    root.fill(&WHITE)?;

    let last_step = series
        .iter()
        .filter_map(|s| s.points.last())
        .map(|&(step, _)| step)
        .fold(0.0, f64::max)
        .max(1.0);
    let (y_min, y_max) = pad_range(
        finite_range(series.iter().flat_map(|s| s.points.iter().map(|&(_, e)| e))),
        0.05,
    );

    let mut chart = ChartBuilder::on(&root)
        .caption(&ctx.title, ctx.caption_style())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..last_step + 0.5, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Step")
        .y_desc(&ctx.error_label)
        .draw()?;

    let mut labelled = false;
    for (idx, s) in series.iter().enumerate() {
        let color = series_color(idx);
        let finite: Vec<(f64, f64)> = s.points.iter().copied().filter(|p| p.1.is_finite()).collect();
        let anno = chart.draw_series(LineSeries::new(finite.iter().copied(), color.stroke_width(2)))?;
        if !s.label.is_empty() {
            labelled = true;
            anno.label(s.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        chart.draw_series(finite.iter().map(|&p| Circle::new(p, 3, BLACK.filled())))?;
    }

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
