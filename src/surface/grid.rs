//! Dense evaluation grids over the padded trajectory bounds.
//!
//! One free parameter gives a sampled curve, two give a meshgrid in the
//! matplotlib layout (rows follow the second parameter, columns the first).
//! Above two parameters nothing is materialized.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Dimensionality, ParameterBounds};
use crate::surface::ErrorSurface;

/// Grid points per free axis when none is configured.
pub const DEFAULT_RESOLUTION: usize = 100;

/// An error surface sampled on a grid, tagged by dimensionality.
#[derive(Debug, Clone)]
pub enum ErrorSurfaceGrid {
    /// `(parameter value, error)` pairs in increasing parameter order.
    OneParam(Vec<(f64, f64)>),
    /// Coordinate grids and the pointwise error, all `resolution × resolution`.
    TwoParam {
        a: DMatrix<f64>,
        b: DMatrix<f64>,
        error: DMatrix<f64>,
    },
    HighDim(usize),
}

impl ErrorSurfaceGrid {
    /// Finite `(min, max)` of `log10(error)` over the grid.
    pub fn log10_range(&self) -> Option<(f64, f64)> {
        let errors: Box<dyn Iterator<Item = f64> + '_> = match self {
            ErrorSurfaceGrid::OneParam(points) => Box::new(points.iter().map(|&(_, e)| e)),
            ErrorSurfaceGrid::TwoParam { error, .. } => Box::new(error.iter().copied()),
            ErrorSurfaceGrid::HighDim(_) => return None,
        };
        finite_range(errors.map(f64::log10))
    }
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps < 2 {
        return vec![min; steps];
    }
    let step = (max - min) / (steps as f64 - 1.0);
    let mut out: Vec<f64> = (0..steps).map(|i| min + step * i as f64).collect();
    // Pin the last point so the padded bound is hit exactly.
    out[steps - 1] = max;
    out
}

/// Sample the error surface over `bounds` padded by the half-range rule.
pub fn build_grid(
    surface: &ErrorSurface<'_>,
    dimensionality: Dimensionality,
    bounds: &ParameterBounds,
    resolution: usize,
) -> ErrorSurfaceGrid {
    let padded = bounds.padded();
    match dimensionality {
        Dimensionality::OneParam => {
            let (min, max) = padded.ranges[0];
            let points = lin_space(min, max, resolution)
                .into_iter()
                .map(|a| (a, surface.error(&[a])))
                .collect();
            ErrorSurfaceGrid::OneParam(points)
        }
        Dimensionality::TwoParam => {
            let (a_min, a_max) = padded.ranges[0];
            let (b_min, b_max) = padded.ranges[1];
            let a_axis = lin_space(a_min, a_max, resolution);
            let b_axis = lin_space(b_min, b_max, resolution);

            // Cells are independent; evaluate them in parallel.
            let cells: Vec<f64> = (0..resolution * resolution)
                .into_par_iter()
                .map(|k| {
                    let (row, col) = (k / resolution, k % resolution);
                    surface.error(&[a_axis[col], b_axis[row]])
                })
                .collect();

            ErrorSurfaceGrid::TwoParam {
                a: DMatrix::from_fn(resolution, resolution, |_, col| a_axis[col]),
                b: DMatrix::from_fn(resolution, resolution, |row, _| b_axis[row]),
                error: DMatrix::from_row_slice(resolution, resolution, &cells),
            }
        }
        Dimensionality::HighDim(n) => ErrorSurfaceGrid::HighDim(n),
    }
}

/// `(min, max)` over the finite values, or `None` if there are none.
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    (min <= max).then_some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SampleSet, Trajectory};
    use crate::models::ModelDescriptor;

    fn line_setup() -> (ModelDescriptor, SampleSet) {
        let model = ModelDescriptor::parse_header("line(x; a, b) = a*x + b").unwrap();
        let samples = SampleSet::new(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]).unwrap();
        (model, samples)
    }

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(-1.0, 2.0, 7);
        assert_eq!(v.len(), 7);
        assert_eq!(v[0], -1.0);
        assert_eq!(v[6], 2.0);
        assert!((v[1] - -0.5).abs() < 1e-12);
    }

    #[test]
    fn one_param_grid_spans_padded_bounds() {
        let model = ModelDescriptor::parse_header("prop(x; a) = a*x").unwrap();
        let samples = SampleSet::new(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]).unwrap();
        let surface = ErrorSurface::new(&model, &samples);
        let bounds = ParameterBounds {
            ranges: vec![(1.0, 2.0)],
        };

        let ErrorSurfaceGrid::OneParam(points) =
            build_grid(&surface, Dimensionality::OneParam, &bounds, 11)
        else {
            panic!("expected a 1-D grid");
        };
        assert_eq!(points.len(), 11);
        assert_eq!(points[0].0, 0.5);
        assert_eq!(points[10].0, 2.5);
        assert!((points[0].1 - 11.25).abs() < 1e-12);
        assert!((points[10].1 - 1.25).abs() < 1e-12);
    }

    #[test]
    fn two_param_grid_uses_meshgrid_layout() {
        let (model, samples) = line_setup();
        let surface = ErrorSurface::new(&model, &samples);
        let bounds = ParameterBounds {
            ranges: vec![(1.0, 3.0), (0.0, 2.0)],
        };

        let ErrorSurfaceGrid::TwoParam { a, b, error } =
            build_grid(&surface, Dimensionality::TwoParam, &bounds, 9)
        else {
            panic!("expected a 2-D grid");
        };
        assert_eq!(error.shape(), (9, 9));
        assert_eq!(a.shape(), (9, 9));
        // Columns walk the first parameter, rows the second.
        assert_eq!(a[(0, 0)], 0.0);
        assert_eq!(a[(0, 8)], 4.0);
        assert_eq!(b[(0, 0)], -1.0);
        assert_eq!(b[(8, 0)], 3.0);
        for row in 0..9 {
            for col in 0..9 {
                let expected = surface.error(&[a[(row, col)], b[(row, col)]]);
                assert_eq!(error[(row, col)], expected);
            }
        }
        // (a, b) = (2, 1) is the exact fit and sits at the grid centre.
        assert!(error[(4, 4)].abs() < 1e-24);
    }

    #[test]
    fn high_dim_builds_nothing() {
        let model = ModelDescriptor::parse_header("quad(x; a, b, c) = a*x^2 + b*x + c").unwrap();
        let samples = SampleSet::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        let surface = ErrorSurface::new(&model, &samples);
        let bounds = ParameterBounds {
            ranges: vec![(0.0, 1.0); 3],
        };
        let grid = build_grid(&surface, Dimensionality::HighDim(3), &bounds, 100);
        assert!(matches!(grid, ErrorSurfaceGrid::HighDim(3)));
        assert!(grid.log10_range().is_none());
    }

    #[test]
    fn visited_points_fall_inside_the_grid_domain() {
        let (model, samples) = line_setup();
        let surface = ErrorSurface::new(&model, &samples);
        let segments = vec![Trajectory {
            label: "gd".to_string(),
            points: vec![vec![0.0, 0.0], vec![1.0, 0.5], vec![2.2, 1.1]],
        }];
        let bounds = ParameterBounds::from_trajectories(&segments).unwrap();
        let ErrorSurfaceGrid::TwoParam { a, b, .. } =
            build_grid(&surface, Dimensionality::TwoParam, &bounds, 20)
        else {
            panic!("expected a 2-D grid");
        };
        let (a_lo, a_hi) = finite_range(a.iter().copied()).unwrap();
        let (b_lo, b_hi) = finite_range(b.iter().copied()).unwrap();
        for p in &segments[0].points {
            assert!(p[0] >= a_lo && p[0] <= a_hi);
            assert!(p[1] >= b_lo && p[1] <= b_hi);
        }
    }

    #[test]
    fn finite_range_skips_infinities() {
        let range = finite_range([f64::NEG_INFINITY, 2.0, -1.0, f64::NAN]);
        assert_eq!(range, Some((-1.0, 2.0)));
        assert_eq!(finite_range([f64::NEG_INFINITY]), None);
    }
}
