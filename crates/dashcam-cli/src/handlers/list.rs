//! List command handler.

use dashcam::{scenarios, CaptureConfig, Suite};
use std::fmt::Write as _;

use crate::config::CliConfig;
use crate::error::CliResult;

/// Text listing of every suite and its scenarios
#[must_use]
pub fn render_listing(suites: &[Suite]) -> String {
    let mut out = String::new();
    for suite in suites {
        let _ = writeln!(
            out,
            "{} ({} → {})",
            suite.name,
            suite.plan.kind.extension(),
            suite.plan.output_dir.display()
        );
        for name in suite.scenarios.names() {
            let description = suite
                .scenarios
                .get(name)
                .map(|s| s.description())
                .unwrap_or_default();
            let _ = writeln!(out, "  {name:<16} {description}");
        }
    }
    out
}

/// Execute the list command
pub fn execute_list(_config: &CliConfig, capture: &CaptureConfig) -> CliResult<()> {
    print!("{}", render_listing(&scenarios::all(capture)?));
    Ok(())
}
