//! Exchange-file ingest and export.
//!
//! An exchange file is a model header followed by whitespace-separated
//! `x y` rows:
//!
//! ```text
//! NAME(VAR; P1, P2, ...) = EXPRESSION
//! <"x0 y0"  or  "P1=v1, P2=v2, ...">
//! x1 y1
//! ...
//! ```
//!
//! The second line is ambiguous. If it is exactly two floats it is the first
//! data row; otherwise it is an initial-guess override and is skipped. Bad
//! override pairs are reported and leave the default guess in place.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{ParameterVector, SampleSet};
use crate::error::AppError;
use crate::models::ModelDescriptor;

/// Value of every parameter the override line does not set.
pub const DEFAULT_GUESS: f64 = 1.0;

/// Parsed exchange file: the model, its samples and an optional initial guess.
#[derive(Debug, Clone)]
pub struct ExchangeData {
    pub model: ModelDescriptor,
    pub samples: SampleSet,
    /// Present when the second line was an override line.
    pub initial_guess: Option<ParameterVector>,
}

/// Read and parse an exchange file.
pub fn load_exchange_file(path: &Path) -> Result<ExchangeData, AppError> {
    let text = fs::read_to_string(path).map_err(|e| AppError::io(path, "read exchange file", e))?;
    let data = parse_exchange(&text).map_err(|e| e.with_context(path.display()))?;
    debug!(
        path = %path.display(),
        samples = data.samples.len(),
        override_line = data.initial_guess.is_some(),
        "loaded exchange file"
    );
    Ok(data)
}

/// Parse exchange-file text.
pub fn parse_exchange(text: &str) -> Result<ExchangeData, AppError> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| AppError::format("Exchange file is empty."))?;
    let model = ModelDescriptor::parse_header(header)?;

    let rest: Vec<&str> = lines.collect();
    let (initial_guess, skip) = match rest.first() {
        Some(line) if line.trim().is_empty() || parse_row(line).is_some() => (None, 0),
        Some(line) => (Some(parse_override(line, &model)), 1),
        None => (None, 0),
    };

    let mut x = Vec::with_capacity(rest.len());
    let mut y = Vec::with_capacity(rest.len());
    for (idx, line) in rest.iter().enumerate().skip(skip) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // +2: one for the header, one for 1-based numbering.
        let (xv, yv) = parse_row(trimmed).ok_or_else(|| {
            AppError::data_format(format!(
                "line {}: expected two numeric columns, got '{trimmed}'.",
                idx + 2
            ))
        })?;
        x.push(xv);
        y.push(yv);
    }

    let samples = SampleSet::new(x, y)?;
    Ok(ExchangeData {
        model,
        samples,
        initial_guess,
    })
}

/// Exactly two whitespace-separated floats.
fn parse_row(line: &str) -> Option<(f64, f64)> {
    let mut tokens = line.split_whitespace();
    let x = tokens.next()?.parse::<f64>().ok()?;
    let y = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some((x, y))
}

/// Parse `name=value` pairs into a full guess vector.
///
/// Malformed pairs are logged and skipped; the default value stays in place.
fn parse_override(line: &str, model: &ModelDescriptor) -> ParameterVector {
    let mut guess = vec![DEFAULT_GUESS; model.parameter_count()];
    for pair in line.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, value)) = pair.split_once('=') else {
            warn!("Ignoring initial guess '{pair}': expected 'name=value'.");
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        let Some(idx) = model.parameter_index(name) else {
            warn!(
                "Ignoring initial guess '{pair}': '{name}' is not a parameter of {}.",
                model.signature()
            );
            continue;
        };
        match value.parse::<f64>() {
            Ok(v) => guess[idx] = v,
            Err(e) => warn!(
                "Ignoring initial guess '{pair}': {e}; keeping {name}={DEFAULT_GUESS}."
            ),
        }
    }
    guess
}

/// Render an exchange file. With a guess, the override line is written;
/// otherwise the first row takes the ambiguous second line.
pub fn format_exchange(
    model: &ModelDescriptor,
    samples: &SampleSet,
    initial_guess: Option<&[f64]>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", model.header_line()));
    if let Some(guess) = initial_guess {
        let pairs: Vec<String> = model
            .parameters()
            .iter()
            .zip(guess)
            .map(|(name, v)| format!("{name}={v}"))
            .collect();
        out.push_str(&format!("{}\n", pairs.join(", ")));
    }
    for (x, y) in samples.x().iter().zip(samples.y()) {
        out.push_str(&format!("{x} {y}\n"));
    }
    out
}

/// Write an exchange file.
pub fn write_exchange_file(
    path: &Path,
    model: &ModelDescriptor,
    samples: &SampleSet,
    initial_guess: Option<&[f64]>,
) -> Result<(), AppError> {
    fs::write(path, format_exchange(model, samples, initial_guess))
        .map_err(|e| AppError::io(path, "write exchange file", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn preview_line_is_a_data_row() {
        let data = parse_exchange("line(x; a, b) = a*x + b\n0 1\n1 3\n2 5\n").unwrap();
        assert_eq!(data.samples.x(), [0.0, 1.0, 2.0]);
        assert_eq!(data.samples.y(), [1.0, 3.0, 5.0]);
        assert!(data.initial_guess.is_none());
    }

    #[test]
    fn override_line_is_skipped_and_parsed() {
        let data = parse_exchange("line(x; a, b) = a*x + b\nb=-2.5, a=4\n0 1\n1 3\n").unwrap();
        assert_eq!(data.samples.len(), 2);
        assert_eq!(data.initial_guess, Some(vec![4.0, -2.5]));
    }

    #[test]
    fn malformed_override_values_keep_the_default() {
        let data = parse_exchange("line(x; a, b) = a*x + b\na=oops, c=3, b=2\n0 1\n").unwrap();
        assert_eq!(data.initial_guess, Some(vec![DEFAULT_GUESS, 2.0]));
        assert_eq!(data.samples.len(), 1);
    }

    #[test]
    fn three_numbers_are_not_a_preview_row() {
        // Not exactly two floats, so it is treated as an override and skipped.
        let data = parse_exchange("f(x; a) = a*x\n1 2 3\n0 0\n").unwrap();
        assert_eq!(data.samples.len(), 1);
        assert_eq!(data.initial_guess, Some(vec![DEFAULT_GUESS]));
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let data = parse_exchange("f(x; a) = a*x\n0 0\n\n# note\n1 2\n").unwrap();
        assert_eq!(data.samples.len(), 2);
    }

    #[test]
    fn bad_rows_are_data_format_errors() {
        let err = parse_exchange("f(x; a) = a*x\n0 0\n1 two\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFormat);
        assert!(err.to_string().contains("line 3"));

        let err = parse_exchange("f(x; a) = a*x\na=2\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFormat);

        let err = parse_exchange("f(x; a) = a*x\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataFormat);
    }

    #[test]
    fn bad_header_is_a_format_error() {
        let err = parse_exchange("not a header\n0 0\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        let err = parse_exchange("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn written_file_reproduces_noiseless_samples() {
        let model = ModelDescriptor::parse_header("sine(t; A, omega, phi, b) = A * sin(omega*t + phi) + b").unwrap();
        let truth = [1.7, 3.2, 0.4, -0.6];
        let xs: Vec<f64> = (0..50).map(|i| -2.0 + 0.08 * i as f64).collect();
        let ys = model.evaluate_many(&xs, &truth);
        let samples = SampleSet::new(xs, ys).unwrap();

        for guess in [None, Some(&[1.0, 3.0, 0.0, 0.0][..])] {
            let text = format_exchange(&model, &samples, guess);
            let again = parse_exchange(&text).unwrap();
            assert_eq!(again.samples.len(), samples.len());
            let predicted = again.model.evaluate_many(again.samples.x(), &truth);
            for (p, y) in predicted.iter().zip(again.samples.y()) {
                assert!((p - y).abs() < 1e-9, "{p} vs {y}");
            }
        }
    }

    #[test]
    fn formatted_text_has_one_line_per_record() {
        let model = ModelDescriptor::parse_header("line(x; a, b) = a*x + b").unwrap();
        let samples = SampleSet::new(vec![0.0, 1.5], vec![1.0, -2.0]).unwrap();
        let text = format_exchange(&model, &samples, Some(&[4.0, -2.5]));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], model.header_line());
        assert_eq!(&lines[1..], ["a=4, b=-2.5", "0 1", "1.5 -2"]);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn written_file_loads_back_with_its_guess() {
        let model = ModelDescriptor::parse_header("decay(t; k) = exp(-k*t)").unwrap();
        let xs = vec![0.0, 0.5, 1.0];
        let ys = model.evaluate_many(&xs, &[2.0]);
        let samples = SampleSet::new(xs, ys).unwrap();
        let path = std::env::temp_dir().join(format!("descent-viz-exchange-{}.dat", std::process::id()));

        write_exchange_file(&path, &model, &samples, Some(&[0.3])).unwrap();
        let data = load_exchange_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(data.model.signature(), "decay(t; k)");
        assert_eq!(data.initial_guess, Some(vec![0.3]));
        assert_eq!(data.samples, samples);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("descent-viz-does-not-exist.dat");
        let err = load_exchange_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("descent-viz-does-not-exist.dat"));
    }
}
