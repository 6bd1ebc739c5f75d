//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded inputs (`SampleSet`, `Trajectory`)
//! - derived quantities (`ParameterBounds`, `Dimensionality`)
//! - run configuration and the exported summary (`RunConfig`, `RunSummary`)

pub mod types;

pub use types::*;
