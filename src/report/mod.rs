//! Run summaries: what was loaded, what each segment achieved, what was written.
//!
//! Formatting lives here so the parsing and rendering code stays free of
//! terminal output.

use std::path::PathBuf;

use crate::domain::{ParameterBounds, RunSummary, SegmentSummary, Trajectory};
use crate::io::ExchangeData;
use crate::surface::ErrorSurface;

/// Per-segment first/last error and final point.
pub fn summarize_segments(surface: &ErrorSurface<'_>, trajectories: &[Trajectory]) -> Vec<SegmentSummary> {
    trajectories
        .iter()
        .filter_map(|t| {
            let first = t.points.first()?;
            let last = t.points.last()?;
            Some(SegmentSummary {
                label: t.label.clone(),
                points: t.len(),
                first_error: surface.error(first),
                last_error: surface.error(last),
                last_point: last.clone(),
            })
        })
        .collect()
}

/// Assemble the summary of a finished run.
pub fn build_run_summary(
    exchange: &ExchangeData,
    trajectories: &[Trajectory],
    padded: &ParameterBounds,
    artifacts: Vec<PathBuf>,
) -> RunSummary {
    let surface = ErrorSurface::new(&exchange.model, &exchange.samples);
    RunSummary {
        tool: env!("CARGO_PKG_NAME").to_string(),
        model: exchange.model.header_line(),
        parameters: exchange.model.parameters().to_vec(),
        dimensionality: exchange.model.dimensionality().label(),
        samples: exchange.samples.len(),
        initial_guess: exchange.initial_guess.clone(),
        bounds: padded.ranges.iter().map(|&(lo, hi)| [lo, hi]).collect(),
        segments: summarize_segments(&surface, trajectories),
        artifacts,
    }
}

/// Format the terminal report for a run.
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("=== descent-plot ===\n");
    out.push_str(&format!("Model: {}\n", summary.model));
    out.push_str(&format!(
        "Samples: n={} | parameters={} | {}\n",
        summary.samples,
        summary.parameters.len(),
        summary.dimensionality
    ));
    if let Some(guess) = &summary.initial_guess {
        out.push_str(&format!("Initial guess: {}\n", format_point(guess)));
    }

    out.push_str("\nSegments:\n");
    out.push_str(&format!(
        "{:<24} {:>6} {:>14} {:>14}  {}\n",
        "Label", "Points", "First E", "Last E", "Last point"
    ));
    for s in &summary.segments {
        let label = if s.label.is_empty() { "(unlabelled)" } else { s.label.as_str() };
        out.push_str(&format!(
            "{:<24} {:>6} {:>14.6e} {:>14.6e}  {}\n",
            truncate(label, 24),
            s.points,
            s.first_error,
            s.last_error,
            format_point(&s.last_point)
        ));
    }

    out.push_str("\nWrote:\n");
    for path in &summary.artifacts {
        out.push_str(&format!("  {}\n", path.display()));
    }

    out
}

fn format_point(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("({})", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}
