//! Animated replay of a descent.
//!
//! Every frame has two stacked panels:
//! - top: the samples and the model curve at the current parameters
//! - bottom: the natural-log error of every point visited so far
//!
//! A few frames hold the first point before the replay starts and a few more
//! hold the final point afterwards. Axis limits are computed once, so nothing
//! rescales between frames.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::domain::{ParameterVector, SampleSet};
use crate::error::AppError;
use crate::plot::context::{RenderContext, pad_range};
use crate::surface::{ErrorSurface, finite_range, lin_space};

/// Frames showing the first point before playback advances.
pub const DEFAULT_LEAD_IN: usize = 2;
/// Frames holding the final point once playback is done.
pub const DEFAULT_LEAD_OUT: usize = 5;
pub const DEFAULT_FRAME_DELAY_MS: u32 = 400;
/// Default animation size: two panels stacked, so taller than wide.
pub const DEFAULT_ANIMATION_SIZE: (u32, u32) = (800, 1000);

/// Fraction of each data range added as axis margin.
const AXIS_MARGIN: f64 = 0.1;
/// Points used to draw the model curve.
const CURVE_POINTS: usize = 200;

/// Which point each frame shows.
///
/// With `L` points the plan has `L - 1 + lead_in + lead_out` frames. The
/// point index starts at 0, advances by one per frame once the lead-in is
/// over, and stays at `L - 1` through the lead-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    points: usize,
    lead_in: usize,
    lead_out: usize,
}

impl FramePlan {
    pub fn new(points: usize, lead_in: usize, lead_out: usize) -> Result<Self, AppError> {
        if points == 0 {
            return Err(AppError::validation("Cannot animate a path without points."));
        }
        let plan = Self {
            points,
            lead_in,
            lead_out,
        };
        if plan.frame_count() == 0 {
            return Err(AppError::validation(
                "A single-point animation needs a lead-in or lead-out frame.",
            ));
        }
        Ok(plan)
    }

    pub fn frame_count(&self) -> usize {
        self.points - 1 + self.lead_in + self.lead_out
    }

    /// Index of the point shown in `frame`.
    pub fn point_index(&self, frame: usize) -> usize {
        (frame + 1).saturating_sub(self.lead_in).min(self.points - 1)
    }

    /// Length of the error series drawn in `frame`.
    pub fn series_len(&self, frame: usize) -> usize {
        self.point_index(frame) + 1
    }
}

/// Fixed axis limits for both panels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Axes {
    fit_x: (f64, f64),
    fit_y: (f64, f64),
    error_x: (f64, f64),
    error_y: (f64, f64),
}

impl Axes {
    fn new(samples: &SampleSet, log_errors: &[f64]) -> Self {
        let (x_min, x_max) = samples.x_range();
        let (y_min, y_max) = samples.y_range();
        Self {
            fit_x: pad_range(Some((x_min, x_max)), AXIS_MARGIN),
            fit_y: pad_range(Some((y_min, y_max)), AXIS_MARGIN),
            error_x: (-0.1, (log_errors.len() - 1) as f64 + 0.1),
            error_y: pad_range(finite_range(log_errors.iter().copied()), AXIS_MARGIN),
        }
    }
}

/// Render the replay of `points` (all segments concatenated) as a GIF.
pub fn render_animation(
    ctx: &RenderContext,
    path: &Path,
    surface: &ErrorSurface<'_>,
    points: &[ParameterVector],
    plan: FramePlan,
    frame_delay_ms: u32,
) -> Result<(), AppError> {
    let log_errors: Vec<f64> = points.iter().map(|p| surface.ln_error(p)).collect();
    let axes = Axes::new(surface.samples(), &log_errors);
    info!(
        path = %path.display(),
        frames = plan.frame_count(),
        "rendering animation"
    );
    draw_frames(ctx, path, surface, points, &log_errors, plan, axes, frame_delay_ms)
        .map_err(|e| AppError::render(path, e))
}

#[allow(clippy::too_many_arguments)]
fn draw_frames(
    ctx: &RenderContext,
    path: &Path,
    surface: &ErrorSurface<'_>,
    points: &[ParameterVector],
    log_errors: &[f64],
    plan: FramePlan,
    axes: Axes,
    frame_delay_ms: u32,
) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::gif(path, ctx.size, frame_delay_ms)?.into_drawing_area();
    let xs = lin_space(axes.fit_x.0, axes.fit_x.1, CURVE_POINTS);
    let samples = surface.samples();

    for frame in 0..plan.frame_count() {
        let shown = plan.point_index(frame);
        root.fill(&WHITE)?;
        let (top, bottom) = root.split_vertically(ctx.size.1 / 2);

        let curve = visible_runs(
            xs.iter()
                .copied()
                .zip(surface.model().evaluate_many(&xs, &points[shown])),
            axes.fit_y,
        );
        draw_fit_panel(ctx, &top, samples, &curve, axes)?;

        let series: Vec<(f64, f64)> = log_errors[..plan.series_len(frame)]
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_finite())
            .map(|(i, &e)| (i as f64, e))
            .collect();
        draw_error_panel(ctx, &bottom, &series, axes)?;

        root.present()?;
        debug!(frame, point = shown, "rendered animation frame");
    }
    Ok(())
}

/// Split a curve into runs of consecutive points with `lo <= y <= hi`.
///
/// Out-of-range and non-finite points break the curve, so it leaves the
/// panel instead of running along its edge.
fn visible_runs(
    curve: impl IntoIterator<Item = (f64, f64)>,
    (lo, hi): (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut run = Vec::new();
    for (x, y) in curve {
        if y.is_finite() && (lo..=hi).contains(&y) {
            run.push((x, y));
        } else if !run.is_empty() {
            runs.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

fn draw_fit_panel<DB>(
    ctx: &RenderContext,
    area: &DrawingArea<DB, Shift>,
    samples: &SampleSet,
    curve: &[Vec<(f64, f64)>],
    axes: Axes,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(&ctx.title, ctx.caption_style())
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(axes.fit_x.0..axes.fit_x.1, axes.fit_y.0..axes.fit_y.1)?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    chart.draw_series(
        samples
            .x()
            .iter()
            .zip(samples.y())
            .map(|(&x, &y)| Circle::new((x, y), 3, BLUE.filled())),
    )?;
    for run in curve {
        chart.draw_series(LineSeries::new(run.iter().copied(), RED.stroke_width(2)))?;
    }
    Ok(())
}

fn draw_error_panel<DB>(
    ctx: &RenderContext,
    area: &DrawingArea<DB, Shift>,
    series: &[(f64, f64)],
    axes: Axes,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(55)
        .build_cartesian_2d(axes.error_x.0..axes.error_x.1, axes.error_y.0..axes.error_y.1)?;
    chart
        .configure_mesh()
        .x_desc("Step")
        .y_desc(ctx.error_label.replacen("log", "ln", 1))
        .draw()?;

    chart.draw_series(LineSeries::new(series.iter().copied(), BLACK.stroke_width(2)))?;
    chart.draw_series(series.iter().map(|&p| Circle::new(p, 3, RED.filled())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn frame_count_adds_lead_in_and_out() {
        let plan = FramePlan::new(10, DEFAULT_LEAD_IN, DEFAULT_LEAD_OUT).unwrap();
        assert_eq!(plan.frame_count(), 9 + 2 + 5);
    }

    #[test]
    fn playback_holds_then_advances_then_holds() {
        let plan = FramePlan::new(4, 2, 5).unwrap();
        let shown: Vec<usize> = (0..plan.frame_count()).map(|f| plan.point_index(f)).collect();
        assert_eq!(shown, vec![0, 0, 1, 2, 3, 3, 3, 3, 3, 3]);
        let last = plan.frame_count() - 1;
        assert_eq!(plan.series_len(last), 4);
        assert_eq!(plan.series_len(0), 1);
    }

    #[test]
    fn series_never_shrinks() {
        let plan = FramePlan::new(7, 3, 1).unwrap();
        for f in 1..plan.frame_count() {
            assert!(plan.series_len(f) >= plan.series_len(f - 1));
            assert!(plan.series_len(f) - plan.series_len(f - 1) <= 1);
        }
    }

    #[test]
    fn degenerate_plans_are_rejected() {
        assert_eq!(FramePlan::new(0, 2, 5).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(FramePlan::new(1, 0, 0).unwrap_err().kind(), ErrorKind::Validation);
        assert_eq!(FramePlan::new(1, 0, 1).unwrap().frame_count(), 1);
    }

    #[test]
    fn axes_are_padded_and_cover_every_step() {
        let samples = SampleSet::new(vec![0.0, 10.0], vec![-5.0, 5.0]).unwrap();
        let axes = Axes::new(&samples, &[3.0, 1.0, f64::NEG_INFINITY]);
        assert_eq!(axes.fit_x, (-1.0, 11.0));
        assert_eq!(axes.fit_y, (-6.0, 6.0));
        assert_eq!(axes.error_x, (-0.1, 2.1));
        let (lo, hi) = axes.error_y;
        assert!(lo < 1.0 && hi > 3.0);
    }

    #[test]
    fn curve_breaks_where_it_leaves_the_panel() {
        let ys = [0.0, 5.0, 20.0, f64::NAN, 3.0, 1.0, -7.0];
        let curve = ys.iter().enumerate().map(|(i, &y)| (i as f64, y));
        let runs = visible_runs(curve, (-6.0, 6.0));
        assert_eq!(
            runs,
            vec![vec![(0.0, 0.0), (1.0, 5.0)], vec![(4.0, 3.0), (5.0, 1.0)]]
        );
        // No point is moved onto the panel edge.
        assert!(runs.iter().flatten().all(|&(_, y)| y != 6.0 && y != -6.0));
    }

    #[test]
    fn curve_fully_outside_the_panel_draws_nothing() {
        let curve = [(0.0, 10.0), (1.0, 11.0)];
        assert!(visible_runs(curve, (-6.0, 6.0)).is_empty());
        let inside = [(0.0, -6.0), (1.0, 6.0)];
        assert_eq!(visible_runs(inside, (-6.0, 6.0)), vec![inside.to_vec()]);
    }
}
