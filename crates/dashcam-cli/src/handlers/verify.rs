//! Verify command handler.
//!
//! Unlike the other capture commands, a failed check fails the command.

use dashcam::{scenarios, CaptureConfig, CaptureReport};

use crate::commands::VerifyArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::{apply_browser_args, run_suite};

/// Error for a report with failed checks
pub fn check_report(report: &CaptureReport) -> CliResult<()> {
    let failed = report
        .outcomes
        .iter()
        .filter(|o| !o.succeeded())
        .count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::ChecksFailed {
            failed,
            total: report.outcomes.len(),
        })
    }
}

/// Execute the verify command
pub fn execute_verify(
    config: &CliConfig,
    capture: CaptureConfig,
    args: &VerifyArgs,
) -> CliResult<()> {
    let capture = apply_browser_args(capture, &args.browser);
    let suite = scenarios::verification(&capture)?;
    let report = run_suite(config, &capture, &suite, &args.checks)?;
    check_report(&report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use dashcam::{ArtifactStatus, ScenarioOutcome};
    use std::path::PathBuf;
    use std::time::Duration;

    fn outcome(name: &str, error: Option<&str>) -> ScenarioOutcome {
        ScenarioOutcome {
            name: name.to_string(),
            error: error.map(ToString::to_string),
            artifact: ArtifactStatus::Written(PathBuf::from(format!("{name}.png"))),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_all_passed() {
        let report = CaptureReport {
            outcomes: vec![outcome("watermark", None), outcome("sound", None)],
            unknown: Vec::new(),
        };
        assert!(check_report(&report).is_ok());
    }

    #[test]
    fn test_failed_check_counts() {
        let report = CaptureReport {
            outcomes: vec![
                outcome("watermark", None),
                outcome("live_session", Some("Assertion failed")),
            ],
            unknown: Vec::new(),
        };
        let err = check_report(&report).unwrap_err();
        assert!(matches!(err, CliError::ChecksFailed { failed: 1, total: 2 }));
    }

    #[test]
    fn test_missing_artifact_is_a_failure() {
        let mut missing = outcome("all_widgets", None);
        missing.artifact = ArtifactStatus::Missing("browser launch failed".to_string());
        let report = CaptureReport {
            outcomes: vec![missing],
            unknown: Vec::new(),
        };
        assert!(check_report(&report).is_err());
    }

    #[test]
    fn test_unknown_only_passes() {
        let report = CaptureReport {
            outcomes: Vec::new(),
            unknown: vec!["nope".to_string()],
        };
        assert!(check_report(&report).is_ok());
    }
}
