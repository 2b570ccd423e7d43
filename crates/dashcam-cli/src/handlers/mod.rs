//! Command handlers - one module per subcommand
//!
//! Capture commands share the same path: load the capture config, check the
//! document exists, then run one suite on a current-thread runtime.

pub mod comparisons;
pub mod demo;
pub mod list;
pub mod record;
pub mod verify;

pub use comparisons::execute_comparisons;
pub use demo::execute_demo;
pub use list::{execute_list, render_listing};
pub use record::execute_record;
pub use verify::execute_verify;

use dashcam::{CaptureConfig, CaptureReport, DriverLauncher, Orchestrator, Suite};
use std::path::Path;
use tracing::debug;

use crate::commands::BrowserArgs;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;

/// Capture config from `--config` (or defaults) plus `CHROMIUM_PATH`
pub fn load_capture_config(path: Option<&Path>) -> CliResult<CaptureConfig> {
    let config = match path {
        Some(path) => CaptureConfig::from_yaml_file(path)?,
        None => CaptureConfig::default(),
    };
    Ok(config.with_env_overrides())
}

/// Apply per-command browser flags
#[must_use]
pub fn apply_browser_args(mut capture: CaptureConfig, args: &BrowserArgs) -> CaptureConfig {
    if let Some(ref html) = args.html {
        capture = capture.with_html_path(html);
    }
    if args.headed {
        capture = capture.with_headless(false);
    }
    if args.no_sandbox {
        capture = capture.with_no_sandbox();
    }
    if let Some(ref chrome) = args.chrome {
        capture.chrome_path = Some(chrome.clone());
    }
    capture
}

#[cfg(feature = "browser")]
fn launcher(capture: &CaptureConfig) -> CliResult<Box<dyn DriverLauncher>> {
    Ok(Box::new(dashcam::ChromiumLauncher::from_config(capture)))
}

#[cfg(not(feature = "browser"))]
fn launcher(_capture: &CaptureConfig) -> CliResult<Box<dyn DriverLauncher>> {
    Err(crate::error::CliError::config(
        "dashcam was built without the `browser` feature",
    ))
}

/// Run `names` of `suite` in Chromium, printing progress
pub fn run_suite(
    config: &CliConfig,
    capture: &CaptureConfig,
    suite: &Suite,
    names: &[String],
) -> CliResult<CaptureReport> {
    // Missing document is fatal before any browser starts
    let document_url = capture.document_url()?;
    let launcher = launcher(capture)?;
    debug!(suite = suite.name, document = %document_url, "running suite");

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    if config.verbosity.is_verbose() {
        reporter = reporter.without_bar();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(
        Orchestrator::new(launcher.as_ref(), document_url)
            .with_observer(&reporter)
            .run(suite, names),
    )?;

    reporter.summary(suite.name, &report);
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::path::PathBuf;

    mod config_loading_tests {
        use super::*;

        #[test]
        fn test_missing_config_file_is_an_error() {
            let err = load_capture_config(Some(Path::new("/nonexistent/dashcam.yaml")))
                .unwrap_err();
            assert!(matches!(err, CliError::Dashcam(_)));
        }

        #[test]
        fn test_yaml_config_is_read() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("dashcam.yaml");
            std::fs::write(&path, "fps: 30\nsession_code: ABC123\n").unwrap();
            let config = load_capture_config(Some(path.as_path())).unwrap();
            assert_eq!(config.fps, 30);
            assert_eq!(config.session_code, "ABC123");
        }
    }

    mod browser_args_tests {
        use super::*;

        #[test]
        fn test_flags_override_config() {
            let args = BrowserArgs {
                html: Some(PathBuf::from("site/index.html")),
                headed: true,
                no_sandbox: true,
                chrome: Some(PathBuf::from("/opt/chromium")),
            };
            let capture = apply_browser_args(CaptureConfig::default(), &args);
            assert_eq!(capture.html_path, PathBuf::from("site/index.html"));
            assert!(!capture.headless);
            assert!(!capture.sandbox);
            assert_eq!(capture.chrome_path, Some(PathBuf::from("/opt/chromium")));
        }

        #[test]
        fn test_no_flags_keep_config() {
            let capture = apply_browser_args(CaptureConfig::default(), &BrowserArgs::default());
            assert_eq!(capture, CaptureConfig::default());
        }
    }

    mod run_suite_tests {
        use super::*;

        #[test]
        fn test_missing_document_fails_before_launch() {
            let capture = CaptureConfig::default().with_html_path("/nonexistent/index.html");
            let suite = dashcam::scenarios::verification(&capture).unwrap();
            let err = run_suite(&CliConfig::default(), &capture, &suite, &[]).unwrap_err();
            assert!(err.to_string().contains("not found"));
        }
    }
}
