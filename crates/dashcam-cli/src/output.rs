//! Output formatting and progress reporting

use console::{style, Term};
use dashcam::{ArtifactStatus, CaptureObserver, CaptureReport, ScenarioOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::OnceLock;

/// Progress reporter for capture runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: OnceLock<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Hide the bar (log lines are shown instead)
    pub hide_bar: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: OnceLock::new(),
            use_color,
            quiet,
            hide_bar: false,
        }
    }

    /// Do not draw a progress bar
    #[must_use]
    pub const fn without_bar(mut self) -> Self {
        self.hide_bar = true;
        self
    }

    fn bar(&self, total: usize) -> Option<&ProgressBar> {
        if self.quiet || self.hide_bar {
            return None;
        }
        Some(self.progress_bar.get_or_init(|| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        }))
    }

    fn line(&self, text: &str) {
        match self.progress_bar.get() {
            Some(pb) => pb.suspend(|| {
                let _ = self.term.write_line(text);
            }),
            None => {
                let _ = self.term.write_line(text);
            }
        }
    }

    fn prefixed(&self, glyph: &str, plain: &str, paint: fn(String) -> String, message: &str) {
        let prefix = if self.use_color {
            paint(glyph.to_string())
        } else {
            plain.to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("✓", "OK", |s| style(s).green().bold().to_string(), message);
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.prefixed("✗", "FAIL", |s| style(s).red().bold().to_string(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("⚠", "WARN", |s| style(s).yellow().bold().to_string(), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.prefixed("ℹ", "INFO", |s| style(s).blue().bold().to_string(), message);
    }

    /// Finish the bar and print the run summary
    pub fn summary(&self, suite: &str, report: &CaptureReport) {
        if let Some(pb) = self.progress_bar.get() {
            pb.finish_and_clear();
        }
        for name in &report.unknown {
            self.warning(&format!("{suite}: no scenario named '{name}'"));
        }
        let failed = report.failures().count();
        let message = format!(
            "{suite}: {} of {} artifacts written, {failed} failed",
            report.written(),
            report.outcomes.len()
        );
        if failed == 0 {
            self.success(&message);
        } else {
            self.failure(&message);
        }
    }
}

/// One line describing a finished scenario
#[must_use]
pub fn describe_outcome(outcome: &ScenarioOutcome) -> String {
    let seconds = outcome.elapsed.as_secs_f64();
    match (&outcome.error, &outcome.artifact) {
        (None, ArtifactStatus::Written(path)) => {
            format!("{} → {} ({seconds:.1}s)", outcome.name, path.display())
        }
        (Some(error), ArtifactStatus::Written(path)) => format!(
            "{}: {error} (captured anyway → {})",
            outcome.name,
            path.display()
        ),
        (None, ArtifactStatus::Missing(reason)) => format!("{}: {reason}", outcome.name),
        (Some(error), ArtifactStatus::Missing(reason)) => {
            format!("{}: {error}; {reason}", outcome.name)
        }
    }
}

impl CaptureObserver for ProgressReporter {
    fn scenario_started(&self, name: &str, _index: usize, total: usize) {
        if let Some(pb) = self.bar(total) {
            pb.set_message(name.to_string());
        }
    }

    fn scenario_finished(&self, outcome: &ScenarioOutcome) {
        let line = describe_outcome(outcome);
        if outcome.succeeded() {
            self.success(&line);
        } else {
            self.failure(&line);
        }
        if let Some(pb) = self.progress_bar.get() {
            pb.inc(1);
        }
    }
}
