//! Rendering context shared by every plot of a run.
//!
//! All draw calls receive one of these explicitly; there is no global
//! "current figure" state, so the landscape, the step plot and the animation
//! cannot leak settings into one another.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::models::ModelDescriptor;

/// Where and how a run's images are drawn.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub output_folder: PathBuf,
    pub prefix: String,
    /// Image size in pixels (width, height).
    pub size: (u32, u32),
    /// Plot title: model signature and its typeset expression.
    pub title: String,
    /// Axis label for log-error values, e.g. `log(E(a, b))`.
    pub error_label: String,
    pub parameter_names: Vec<String>,
}

impl RenderContext {
    pub fn new(model: &ModelDescriptor, output_folder: &Path, prefix: &str, size: (u32, u32)) -> Self {
        Self {
            output_folder: output_folder.to_path_buf(),
            prefix: prefix.to_string(),
            size,
            title: format!("Parameter optimization for {}", model.header_line()),
            error_label: format!("log(E({}))", model.parameters().join(", ")),
            parameter_names: model.parameters().to_vec(),
        }
    }

    /// `<folder>/<prefix>_<suffix>.png`
    pub fn artifact(&self, suffix: &str) -> PathBuf {
        self.output_folder
            .join(format!("{}_{suffix}.png", self.prefix))
    }

    pub fn caption_style(&self) -> TextStyle<'static> {
        ("sans-serif", 18).into_font().into()
    }
}

/// Color for the `idx`-th series.
pub fn series_color(idx: usize) -> RGBAColor {
    Palette99::pick(idx).mix(0.9)
}

/// A drawable `(min, max)` around `range`, widened by `frac` of its span.
///
/// Missing or zero-width ranges still produce a usable axis.
pub fn pad_range(range: Option<(f64, f64)>, frac: f64) -> (f64, f64) {
    let Some((min, max)) = range else {
        return (0.0, 1.0);
    };
    let span = (max - min).abs();
    if span < 1e-12 {
        let pad = 0.5 * min.abs().max(1.0);
        return (min - pad, max + pad);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_names_artifacts_and_labels() {
        let model = ModelDescriptor::parse_header("line(x; a, b) = a*x + b").unwrap();
        let ctx = RenderContext::new(&model, Path::new("figures"), "line", (800, 600));
        assert_eq!(ctx.artifact("error_decrease"), Path::new("figures/line_error_decrease.png"));
        assert_eq!(ctx.error_label, "log(E(a, b))");
        assert!(ctx.title.contains("line(x; a, b) = a*x + b"));
    }

    #[test]
    fn pad_range_handles_degenerate_input() {
        assert_eq!(pad_range(None, 0.1), (0.0, 1.0));
        assert_eq!(pad_range(Some((2.0, 2.0)), 0.1), (1.0, 3.0));
        let (lo, hi) = pad_range(Some((0.0, 10.0)), 0.1);
        assert!((lo - -1.0).abs() < 1e-12 && (hi - 11.0).abs() < 1e-12);
    }
}
