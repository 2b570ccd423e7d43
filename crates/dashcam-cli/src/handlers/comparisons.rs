//! Comparisons command handler.

use dashcam::{scenarios, CaptureConfig};

use crate::commands::ComparisonsArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::{apply_browser_args, run_suite};

/// Execute the comparisons command
pub fn execute_comparisons(
    config: &CliConfig,
    capture: CaptureConfig,
    args: &ComparisonsArgs,
) -> CliResult<()> {
    let capture = apply_browser_args(capture, &args.browser);
    let suite = scenarios::comparisons(&capture)?;
    run_suite(config, &capture, &suite, &args.widgets)?;
    Ok(())
}
