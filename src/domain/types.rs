//! Shared domain types.
//!
//! Everything here is built once during parsing and never mutated afterwards.
//! The summary types are serializable so a run can be exported as JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Half-range margin added on each side of the observed trajectory bounds.
pub const PADDING_FACTOR: f64 = 0.5;

/// A parameter vector; its length always equals the model's parameter count.
pub type ParameterVector = Vec<f64>;

/// Index-paired `(x, y)` observations.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SampleSet {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, AppError> {
        if x.len() != y.len() {
            return Err(AppError::data_format(format!(
                "Sample columns differ in length: {} x-values, {} y-values.",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(AppError::data_format("No numeric sample rows."));
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_range(&self) -> (f64, f64) {
        min_max(&self.x)
    }

    pub fn y_range(&self) -> (f64, f64) {
        min_max(&self.y)
    }
}

/// One labelled run of visited parameter vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    pub label: String,
    pub points: Vec<ParameterVector>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Concatenate every segment into one sequence of points.
pub fn flatten(trajectories: &[Trajectory]) -> Vec<ParameterVector> {
    trajectories
        .iter()
        .flat_map(|t| t.points.iter().cloned())
        .collect()
}

/// Rendering strategy, resolved once from the parameter count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensionality {
    OneParam,
    TwoParam,
    /// No surface is rendered above two free parameters.
    HighDim(usize),
}

impl Dimensionality {
    pub fn from_parameter_count(n: usize) -> Self {
        match n {
            1 => Dimensionality::OneParam,
            2 => Dimensionality::TwoParam,
            n => Dimensionality::HighDim(n),
        }
    }

    pub fn renders_surface(self) -> bool {
        !matches!(self, Dimensionality::HighDim(_))
    }

    pub fn label(self) -> String {
        match self {
            Dimensionality::OneParam => "1-D".to_string(),
            Dimensionality::TwoParam => "2-D".to_string(),
            Dimensionality::HighDim(n) => format!("{n}-D (no surface)"),
        }
    }
}

/// Per-parameter `(min, max)` over every visited point.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBounds {
    pub ranges: Vec<(f64, f64)>,
}

impl ParameterBounds {
    /// Bounds over all points of all trajectories, or `None` without points.
    pub fn from_trajectories(trajectories: &[Trajectory]) -> Option<Self> {
        let mut points = trajectories.iter().flat_map(|t| t.points.iter());
        let first = points.next()?;
        let mut ranges: Vec<(f64, f64)> = first.iter().map(|&v| (v, v)).collect();
        for p in points {
            for (range, &v) in ranges.iter_mut().zip(p) {
                range.0 = range.0.min(v);
                range.1 = range.1.max(v);
            }
        }
        Some(Self { ranges })
    }

    pub fn dim(&self) -> usize {
        self.ranges.len()
    }

    /// Widen each side by `PADDING_FACTOR` times the observed range.
    ///
    /// A parameter that never moved gets a half-width of `0.5 * max(|v|, 1)`
    /// so grids over it are never degenerate.
    pub fn padded(&self) -> Self {
        let ranges = self
            .ranges
            .iter()
            .map(|&(min, max)| {
                let span = max - min;
                let pad = if span > 0.0 {
                    span * PADDING_FACTOR
                } else {
                    PADDING_FACTOR * min.abs().max(1.0)
                };
                (min - pad, max + pad)
            })
            .collect();
        Self { ranges }
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.ranges.len()
            && point
                .iter()
                .zip(&self.ranges)
                .all(|(&v, &(min, max))| v >= min && v <= max)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI arguments (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub datafile: PathBuf,
    pub trajectory_file: PathBuf,
    pub output_folder: PathBuf,
    pub output_prefix: String,

    /// Grid points per free axis.
    pub resolution: usize,
    pub image_width: u32,
    pub image_height: u32,

    /// Where to write the animation; `None` skips it.
    pub animation: Option<PathBuf>,
    pub lead_in: usize,
    pub lead_out: usize,
    pub frame_delay_ms: u32,

    pub export_summary: Option<PathBuf>,
}

/// Per-segment part of a run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub label: String,
    pub points: usize,
    pub first_error: f64,
    pub last_error: f64,
    pub last_point: ParameterVector,
}

/// A saved run summary (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub model: String,
    pub parameters: Vec<String>,
    pub dimensionality: String,
    pub samples: usize,
    pub initial_guess: Option<ParameterVector>,
    /// Padded per-parameter grid domain.
    pub bounds: Vec<[f64; 2]>,
    pub segments: Vec<SegmentSummary>,
    pub artifacts: Vec<PathBuf>,
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
