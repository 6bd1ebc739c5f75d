//! Residual sum of squares against the loaded samples.

use crate::domain::{SampleSet, Trajectory};
use crate::models::ModelDescriptor;

/// The scalar field `p -> Σ (f(x_i; p) - y_i)^2`.
#[derive(Debug, Clone, Copy)]
pub struct ErrorSurface<'a> {
    model: &'a ModelDescriptor,
    samples: &'a SampleSet,
}

impl<'a> ErrorSurface<'a> {
    pub fn new(model: &'a ModelDescriptor, samples: &'a SampleSet) -> Self {
        Self { model, samples }
    }

    pub fn model(&self) -> &'a ModelDescriptor {
        self.model
    }

    pub fn samples(&self) -> &'a SampleSet {
        self.samples
    }

    /// Sum of squared residuals at `params`. Zero iff every sample is hit exactly.
    ///
    /// # Panics
    /// Panics if `params.len()` differs from the model's parameter count.
    pub fn error(&self, params: &[f64]) -> f64 {
        self.model
            .evaluate_many(self.samples.x(), params)
            .iter()
            .zip(self.samples.y())
            .map(|(fit, y)| {
                let r = fit - y;
                r * r
            })
            .sum()
    }

    /// `log10(error)`; an exact fit gives `-inf`.
    pub fn log10_error(&self, params: &[f64]) -> f64 {
        self.error(params).log10()
    }

    /// Natural-log error, used by the animation panel.
    pub fn ln_error(&self, params: &[f64]) -> f64 {
        self.error(params).ln()
    }

    /// `log10(error)` for every point of a segment, in order.
    pub fn log10_errors(&self, trajectory: &Trajectory) -> Vec<f64> {
        trajectory
            .points
            .iter()
            .map(|p| self.log10_error(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proportional() -> (ModelDescriptor, SampleSet) {
        let model = ModelDescriptor::parse_header("prop(x; a) = a*x").unwrap();
        let samples = SampleSet::new(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]).unwrap();
        (model, samples)
    }

    #[test]
    fn exact_fit_has_zero_error() {
        let (model, samples) = proportional();
        let surface = ErrorSurface::new(&model, &samples);
        assert_eq!(surface.error(&[2.0]), 0.0);
        assert_eq!(surface.log10_error(&[2.0]), f64::NEG_INFINITY);
    }

    #[test]
    fn error_is_sum_of_squared_residuals() {
        let (model, samples) = proportional();
        let surface = ErrorSurface::new(&model, &samples);
        // Residuals [0, -1.5, -3] and [0, -1, -2].
        assert!((surface.error(&[0.5]) - 11.25).abs() < 1e-12);
        assert!((surface.error(&[1.0]) - 5.0).abs() < 1e-12);
        assert!((surface.ln_error(&[1.0]) - 5.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn error_is_nonnegative_everywhere() {
        let model = ModelDescriptor::parse_header("line(x; a, b) = a*x + b").unwrap();
        let samples = SampleSet::new(vec![-1.0, 0.0, 3.0], vec![0.3, 1.1, 7.9]).unwrap();
        let surface = ErrorSurface::new(&model, &samples);
        for a in [-3.0, 0.0, 1.0, 2.5] {
            for b in [-1.0, 0.0, 4.0] {
                assert!(surface.error(&[a, b]) >= 0.0);
            }
        }
    }

    #[test]
    fn log10_errors_follow_segment_order() {
        let (model, samples) = proportional();
        let surface = ErrorSurface::new(&model, &samples);
        let segment = Trajectory {
            label: "run".to_string(),
            points: vec![vec![1.0], vec![0.5]],
        };
        let errors = surface.log10_errors(&segment);
        assert!((errors[0] - 5.0_f64.log10()).abs() < 1e-12);
        assert!((errors[1] - 11.25_f64.log10()).abs() < 1e-12);
    }
}
