//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - validates them into a `RunConfig`
//! - runs the pipeline
//! - prints the run summary

use clap::Parser;

use crate::cli::Cli;
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `descent-plot` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = run_config_from_args(&cli)?;
    let run = pipeline::run_descent(&config)?;
    println!("{}", crate::report::format_run_summary(&run.summary));
    Ok(())
}

/// Validate CLI arguments and map them into a `RunConfig`.
pub fn run_config_from_args(args: &Cli) -> Result<RunConfig, AppError> {
    if args.resolution < 2 {
        return Err(AppError::validation(format!(
            "--resolution must be at least 2 (got {}).",
            args.resolution
        )));
    }
    if args.width == 0 || args.height == 0 {
        return Err(AppError::validation("--width and --height must be positive."));
    }
    if args.output_prefix.trim().is_empty() {
        return Err(AppError::validation("Output prefix must not be empty."));
    }
    if args.animate.is_some() && args.frame_delay_ms == 0 {
        return Err(AppError::validation("--frame-delay-ms must be positive."));
    }

    Ok(RunConfig {
        datafile: args.datafile.clone(),
        trajectory_file: args.trajectory_file.clone(),
        output_folder: args.output_folder.clone(),
        output_prefix: args.output_prefix.clone(),
        resolution: args.resolution,
        image_width: args.width,
        image_height: args.height,
        animation: args.animate.clone(),
        lead_in: args.lead_in,
        lead_out: args.lead_out,
        frame_delay_ms: args.frame_delay_ms,
        export_summary: args.export_summary.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(extra: &[&str]) -> Cli {
        let mut argv = vec!["descent-plot", "fit.dat", "path.txt", "out", "run"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_map_into_config() {
        let config = run_config_from_args(&parse(&[])).unwrap();
        assert_eq!(config.output_prefix, "run");
        assert_eq!(config.resolution, 100);
        assert_eq!((config.image_width, config.image_height), (1200, 900));
        assert!(config.animation.is_none());
    }

    #[test]
    fn bad_values_are_validation_errors() {
        for extra in [&["--resolution", "1"][..], &["--width", "0"], &["--animate", "a.gif", "--frame-delay-ms", "0"]] {
            let err = run_config_from_args(&parse(extra)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{extra:?}");
        }
    }
}
