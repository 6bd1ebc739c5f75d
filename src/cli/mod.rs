//! Command-line parsing for the descent visualizer.
//!
//! Parsing stays separate from the pipeline: `app::run_config_from_args`
//! turns these raw arguments into a validated `RunConfig`.

use std::path::PathBuf;

use clap::Parser;

use crate::plot::animation::{DEFAULT_FRAME_DELAY_MS, DEFAULT_LEAD_IN, DEFAULT_LEAD_OUT};
use crate::surface::DEFAULT_RESOLUTION;

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "descent-plot",
    version,
    about = "Plot the error landscape and descent path of a curve fit"
)]
pub struct Cli {
    /// Exchange file: model header line followed by `x y` sample rows.
    #[arg(value_name = "DATAFILE")]
    pub datafile: PathBuf,

    /// Path file: segment labels followed by `(p1, p2, ...)` vectors.
    #[arg(value_name = "TRAJECTORY_FILE")]
    pub trajectory_file: PathBuf,

    /// Folder for the rendered images (created when missing).
    #[arg(value_name = "OUTPUT_FOLDER")]
    pub output_folder: PathBuf,

    /// File name prefix for the rendered images.
    #[arg(value_name = "OUTPUT_PREFIX")]
    pub output_prefix: String,

    /// Also render an animated GIF of the descent to this path.
    #[arg(long, value_name = "GIF")]
    pub animate: Option<PathBuf>,

    /// Frames showing the first point before the animation advances.
    #[arg(long, default_value_t = DEFAULT_LEAD_IN)]
    pub lead_in: usize,

    /// Frames holding the final point at the end of the animation.
    #[arg(long, default_value_t = DEFAULT_LEAD_OUT)]
    pub lead_out: usize,

    /// Delay between animation frames (milliseconds).
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    pub frame_delay_ms: u32,

    /// Grid points per free parameter for the error surface.
    #[arg(long, default_value_t = DEFAULT_RESOLUTION)]
    pub resolution: usize,

    /// Image width (pixels).
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Image height (pixels).
    #[arg(long, default_value_t = 900)]
    pub height: u32,

    /// Write a JSON summary of the run (model, bounds, segment errors, files).
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positionals_and_defaults() {
        let cli = Cli::try_parse_from(["descent-plot", "fit.dat", "path.txt", "out", "run1"]).unwrap();
        assert_eq!(cli.datafile, PathBuf::from("fit.dat"));
        assert_eq!(cli.trajectory_file, PathBuf::from("path.txt"));
        assert_eq!(cli.output_folder, PathBuf::from("out"));
        assert_eq!(cli.output_prefix, "run1");
        assert_eq!(cli.lead_in, 2);
        assert_eq!(cli.lead_out, 5);
        assert_eq!(cli.frame_delay_ms, 400);
        assert_eq!(cli.resolution, 100);
        assert!(cli.animate.is_none());
        assert!(cli.export_summary.is_none());
    }

    #[test]
    fn options_override_defaults() {
        let cli = Cli::try_parse_from([
            "descent-plot",
            "fit.dat",
            "path.txt",
            "out",
            "run1",
            "--animate",
            "out/run1.gif",
            "--lead-in",
            "0",
            "--resolution",
            "40",
            "--export-summary",
            "out/run1.json",
        ])
        .unwrap();
        assert_eq!(cli.animate, Some(PathBuf::from("out/run1.gif")));
        assert_eq!(cli.lead_in, 0);
        assert_eq!(cli.resolution, 40);
        assert_eq!(cli.export_summary, Some(PathBuf::from("out/run1.json")));
    }

    #[test]
    fn missing_positionals_are_rejected() {
        assert!(Cli::try_parse_from(["descent-plot", "fit.dat", "path.txt"]).is_err());
    }
}
