//! Record command handler.
//!
//! Records the feature videos; failed scenarios are reported, not fatal.

use dashcam::{scenarios, CaptureConfig};

use crate::commands::RecordArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::{apply_browser_args, run_suite};

/// Capture config for a record run
pub fn record_config(capture: CaptureConfig, args: &RecordArgs) -> CliResult<CaptureConfig> {
    let mut capture = apply_browser_args(capture, &args.browser);
    if let Some(fps) = args.fps {
        capture.fps = fps;
        capture.validate()?;
    }
    Ok(capture)
}

/// Execute the record command
pub fn execute_record(
    config: &CliConfig,
    capture: CaptureConfig,
    args: &RecordArgs,
) -> CliResult<()> {
    let capture = record_config(capture, args)?;
    let suite = scenarios::recordings(&capture)?;
    run_suite(config, &capture, &suite, &args.names)?;
    Ok(())
}
