//! Path-file ingest.
//!
//! A path file is line oriented. A line is a parameter vector iff it is
//! wrapped in parentheses and every comma-separated token inside parses as a
//! float; any other non-empty line labels a new segment:
//!
//! ```text
//! gradient descent
//! (1.0, 1.0)
//! (1.4, 0.8)
//! newton
//! (1.4, 0.8)
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{ParameterVector, Trajectory};
use crate::error::AppError;

/// Read and parse a path file, checking every vector against `parameter_count`.
pub fn load_trajectory_file(
    path: &Path,
    parameter_count: usize,
) -> Result<Vec<Trajectory>, AppError> {
    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, "read trajectory file", e))?;
    let trajectories =
        parse_trajectories(&text, parameter_count).map_err(|e| e.with_context(path.display()))?;
    debug!(
        path = %path.display(),
        segments = trajectories.len(),
        "loaded trajectory file"
    );
    Ok(trajectories)
}

/// Parse path-file text into ordered segments.
///
/// Points before the first label join the first labelled segment; a file
/// without any label yields one segment with an empty label. Segments that
/// end up without points are dropped.
pub fn parse_trajectories(
    text: &str,
    parameter_count: usize,
) -> Result<Vec<Trajectory>, AppError> {
    let mut out = Vec::new();
    let mut current = Trajectory {
        label: String::new(),
        points: Vec::new(),
    };

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_vector(line) {
            Some(point) => {
                if point.len() != parameter_count {
                    return Err(AppError::validation(format!(
                        "line {}: parameter vector has {} values, but the model takes {}.",
                        idx + 1,
                        point.len(),
                        parameter_count
                    )));
                }
                current.points.push(point);
            }
            // Points read before the first label belong to that label.
            None if current.label.is_empty() => current.label = line.to_string(),
            None => {
                let next = Trajectory {
                    label: line.to_string(),
                    points: Vec::new(),
                };
                close_segment(std::mem::replace(&mut current, next), &mut out);
            }
        }
    }
    close_segment(current, &mut out);

    if out.is_empty() {
        return Err(AppError::validation("Trajectory file contains no parameter vectors."));
    }
    Ok(out)
}

fn close_segment(segment: Trajectory, out: &mut Vec<Trajectory>) {
    if !segment.points.is_empty() {
        out.push(segment);
    } else if !segment.label.is_empty() {
        warn!("Skipping segment '{}': it has no parameter vectors.", segment.label);
    }
}

/// `(v1, v2, ...)` with every token a float.
fn parse_vector(line: &str) -> Option<ParameterVector> {
    let inner = line.strip_prefix('(')?.strip_suffix(')')?;
    inner
        .split(',')
        .map(|token| token.trim().parse::<f64>().ok())
        .collect()
}
