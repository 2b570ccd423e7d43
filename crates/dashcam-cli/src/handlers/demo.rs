//! Demo command handler.

use dashcam::{scenarios, CaptureConfig};

use crate::commands::DemoArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::handlers::{apply_browser_args, run_suite};

/// Capture config for the demo, with the session code override
pub fn demo_config(capture: CaptureConfig, args: &DemoArgs) -> CliResult<CaptureConfig> {
    let mut capture = apply_browser_args(capture, &args.browser);
    if let Some(ref code) = args.session_code {
        capture.session_code.clone_from(code);
        capture.validate()?;
    }
    Ok(capture)
}

/// Execute the demo command
pub fn execute_demo(config: &CliConfig, capture: CaptureConfig, args: &DemoArgs) -> CliResult<()> {
    let capture = demo_config(capture, args)?;
    let suite = scenarios::demo(&capture)?;
    run_suite(config, &capture, &suite, &[])?;
    Ok(())
}
