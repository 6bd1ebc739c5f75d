//! Read/write run summary JSON files.
//!
//! A summary is the portable record of one run: model header, sample count,
//! padded bounds, per-segment errors and the images written. The schema is
//! `domain::RunSummary`.

use std::fs::File;
use std::path::Path;

use crate::domain::RunSummary;
use crate::error::AppError;

/// Write a run summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(path, "create summary JSON", e))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::io(path, "write summary JSON", e))?;
    Ok(())
}

/// Read a run summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path).map_err(|e| AppError::io(path, "open summary JSON", e))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::data_format(format!("Invalid summary JSON '{}': {e}", path.display())))
}
