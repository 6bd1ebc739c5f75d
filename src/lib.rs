//! `descent-viz` library crate.
//!
//! The binary (`descent-plot`) is a thin wrapper around this library so that:
//!
//! - parsing, error surfaces and frame planning are testable without spawning processes
//! - the renderers can be driven from other tools that already hold a model and a path

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod models;
pub mod plot;
pub mod report;
pub mod surface;
