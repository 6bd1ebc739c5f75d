//! The descent-visualization pipeline.
//!
//! exchange file -> model + samples -> path file -> bounds -> error grid ->
//! landscape + step plot -> optional animation -> summary
//!
//! Both inputs are fully parsed and validated before the first file is written.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::{ParameterBounds, RunConfig, RunSummary, Trajectory, flatten};
use crate::error::AppError;
use crate::io::{ExchangeData, load_exchange_file, load_trajectory_file, write_summary_json};
use crate::plot::animation::DEFAULT_ANIMATION_SIZE;
use crate::plot::{FramePlan, RenderContext, render_animation, render_descent_path, render_error_decrease};
use crate::surface::{ErrorSurface, build_grid};

/// All outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub exchange: ExchangeData,
    pub trajectories: Vec<Trajectory>,
    pub summary: RunSummary,
}

/// Execute the full pipeline for `config`.
pub fn run_descent(config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Parse and validate inputs.
    let exchange = load_exchange_file(&config.datafile)?;
    let model = &exchange.model;
    let trajectories = load_trajectory_file(&config.trajectory_file, model.parameter_count())?;
    info!(
        model = %model.signature(),
        samples = exchange.samples.len(),
        segments = trajectories.len(),
        "loaded inputs"
    );

    let bounds = ParameterBounds::from_trajectories(&trajectories)
        .ok_or_else(|| AppError::validation("Trajectory file contains no parameter vectors."))?;
    let points = flatten(&trajectories);
    let plan = match config.animation {
        Some(_) => Some(FramePlan::new(points.len(), config.lead_in, config.lead_out)?),
        None => None,
    };

    // 2) Sample the error surface.
    let surface = ErrorSurface::new(model, &exchange.samples);
    let dimensionality = model.dimensionality();
    let grid = build_grid(&surface, dimensionality, &bounds, config.resolution);
    debug!(
        dimensionality = %dimensionality.label(),
        resolution = config.resolution,
        "built error grid"
    );

    // 3) Static plots. Every output location is prepared first, so an
    // unwritable GIF or summary path aborts before any image exists.
    prepare_outputs(config)?;
    let ctx = RenderContext::new(
        model,
        &config.output_folder,
        &config.output_prefix,
        (config.image_width, config.image_height),
    );

    let mut artifacts = Vec::new();
    match render_descent_path(&ctx, &surface, &grid, &trajectories)? {
        Some(path) => artifacts.push(path),
        None => info!(
            parameters = model.parameter_count(),
            "more than two free parameters; skipping the error surface plot"
        ),
    }
    artifacts.push(render_error_decrease(&ctx, &surface, &trajectories)?);

    // 4) Animation.
    if let (Some(path), Some(plan)) = (&config.animation, plan) {
        let anim_ctx = RenderContext {
            size: DEFAULT_ANIMATION_SIZE,
            ..ctx.clone()
        };
        render_animation(&anim_ctx, path, &surface, &points, plan, config.frame_delay_ms)?;
        artifacts.push(path.clone());
    }
    info!(files = artifacts.len(), "rendering done");

    // 5) Summary.
    let summary = crate::report::build_run_summary(&exchange, &trajectories, &bounds.padded(), artifacts);
    if let Some(path) = &config.export_summary {
        write_summary_json(path, &summary)?;
        info!(path = %path.display(), "wrote run summary");
    }

    Ok(RunOutput {
        exchange,
        trajectories,
        summary,
    })
}

/// Create the output folder and the parent folders of the optional GIF and
/// summary files; an existing directory in place of either file is an error.
fn prepare_outputs(config: &RunConfig) -> Result<(), AppError> {
    ensure_dir(&config.output_folder)?;
    for file in [&config.animation, &config.export_summary].into_iter().flatten() {
        if file.is_dir() {
            return Err(AppError::io(file, "write", "path is a directory"));
        }
        if let Some(parent) = file.parent() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| AppError::io(dir, "create output folder", e))
}
