//! Error-surface evaluation.
//!
//! Responsibilities:
//!
//! - residual sum of squares for any parameter vector (`evaluator`)
//! - dense 1-D / 2-D evaluation grids over padded bounds (`grid`, parallel)

pub mod evaluator;
pub mod grid;

pub use evaluator::*;
pub use grid::*;
