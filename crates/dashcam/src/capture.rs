//! Capture orchestrator.
//!
//! Runs scenarios one at a time, each in a freshly launched browser:
//!
//! ```text
//! launch → navigate → install stub → overlay → run → capture → teardown
//! ```
//!
//! A failing scenario is logged and the run moves on; whatever the page shows
//! at that point is still captured. Artifacts land at a fixed path per
//! scenario and replace earlier runs.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::config::{VideoSettings, Viewport};
use crate::director::{Director, Timing};
use crate::driver::{ContextOptions, DriverLauncher, PageDriver};
use crate::overlay::overlay_script;
use crate::result::DashcamResult;
use crate::scenario::{Scenario, ScenarioRegistry};
use crate::stub::{BackendStub, InstallTiming};

/// What a plan captures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// PNG of the final viewport
    Screenshot,
    /// WEBM of the whole scenario
    Video,
}

impl CaptureKind {
    /// Artifact file extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Screenshot => "png",
            Self::Video => "webm",
        }
    }
}

/// How one scenario is set up and captured
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePlan {
    /// Capture kind
    pub kind: CaptureKind,
    /// Artifact directory
    pub output_dir: PathBuf,
    /// Page viewport
    pub viewport: Viewport,
    /// Recording frame rate (videos only)
    pub fps: u8,
    /// Backend stub, if any
    pub stub: Option<BackendStub>,
    /// When the stub is installed
    pub install: InstallTiming,
    /// Inject the cinematic overlay
    pub overlay: bool,
    /// Director timing
    pub timing: Timing,
}

impl CapturePlan {
    /// Screenshot plan
    #[must_use]
    pub fn screenshots(output_dir: impl Into<PathBuf>, viewport: Viewport) -> Self {
        Self {
            kind: CaptureKind::Screenshot,
            output_dir: output_dir.into(),
            viewport,
            fps: 25,
            stub: None,
            install: InstallTiming::AfterLoad,
            overlay: false,
            timing: Timing::default(),
        }
    }

    /// Video plan
    #[must_use]
    pub fn videos(output_dir: impl Into<PathBuf>, viewport: Viewport, fps: u8) -> Self {
        Self {
            kind: CaptureKind::Video,
            fps,
            ..Self::screenshots(output_dir, viewport)
        }
    }

    /// Install a stub
    #[must_use]
    pub fn with_stub(mut self, stub: BackendStub, install: InstallTiming) -> Self {
        self.stub = Some(stub);
        self.install = install;
        self
    }

    /// Install no stub
    #[must_use]
    pub fn without_stub(mut self) -> Self {
        self.stub = None;
        self
    }

    /// Toggle the cinematic overlay
    #[must_use]
    pub const fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    /// Override director timing
    #[must_use]
    pub const fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Deterministic artifact path for `name`
    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}", self.kind.extension()))
    }

    /// Browser context for this plan
    #[must_use]
    pub fn context_options(&self) -> ContextOptions {
        let options = ContextOptions::new(self.viewport);
        match self.kind {
            CaptureKind::Screenshot => options,
            CaptureKind::Video => options.with_video(
                VideoSettings::new(&self.output_dir, self.viewport).with_fps(self.fps),
            ),
        }
    }
}

/// Whether the artifact was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Written at this path
    Written(PathBuf),
    /// Not produced, with the reason
    Missing(String),
}

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Scenario error, if it failed
    pub error: Option<String>,
    /// Artifact status
    pub artifact: ArtifactStatus,
    /// Wall time, launch to teardown
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    /// Ran cleanly and wrote its artifact
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && matches!(self.artifact, ArtifactStatus::Written(_))
    }

    /// Artifact path, if written
    #[must_use]
    pub fn artifact_path(&self) -> Option<&Path> {
        match &self.artifact {
            ArtifactStatus::Written(path) => Some(path),
            ArtifactStatus::Missing(_) => None,
        }
    }
}

/// Result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReport {
    /// One outcome per scenario run
    pub outcomes: Vec<ScenarioOutcome>,
    /// Requested names that matched nothing
    pub unknown: Vec<String>,
}

impl CaptureReport {
    /// Outcomes with a scenario error
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }

    /// Number of artifacts written
    #[must_use]
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.artifact_path().is_some())
            .count()
    }

    /// Every scenario succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::succeeded)
    }
}

/// Receives progress events
pub trait CaptureObserver: Send + Sync {
    /// A scenario is about to launch
    fn scenario_started(&self, _name: &str, _index: usize, _total: usize) {}

    /// A scenario finished
    fn scenario_finished(&self, _outcome: &ScenarioOutcome) {}
}

/// A named set of scenarios sharing one capture plan
#[derive(Debug)]
pub struct Suite {
    /// Suite name
    pub name: &'static str,
    /// Plan every scenario starts from
    pub plan: CapturePlan,
    /// Scenarios
    pub scenarios: ScenarioRegistry,
}

/// Runs suites against a document
pub struct Orchestrator<'a> {
    launcher: &'a dyn DriverLauncher,
    document_url: String,
    observer: Option<&'a dyn CaptureObserver>,
}

impl<'a> Orchestrator<'a> {
    /// Orchestrate with a launcher and the `file://` URL of the document
    pub fn new(launcher: &'a dyn DriverLauncher, document_url: impl Into<String>) -> Self {
        Self {
            launcher,
            document_url: document_url.into(),
            observer: None,
        }
    }

    /// Attach a progress observer
    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn CaptureObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the named scenarios of a suite (all of them if `names` is empty)
    ///
    /// # Errors
    ///
    /// Only if the output directory cannot be created; scenario failures are
    /// reported in the [`CaptureReport`].
    pub async fn run(&self, suite: &Suite, names: &[String]) -> DashcamResult<CaptureReport> {
        let selection = suite.scenarios.select(names);
        for name in &selection.unknown {
            warn!(suite = suite.name, scenario = %name, "scenario not found, skipping");
        }

        tokio::fs::create_dir_all(&suite.plan.output_dir).await?;

        let total = selection.scenarios.len();
        let mut report = CaptureReport {
            outcomes: Vec::with_capacity(total),
            unknown: selection.unknown,
        };
        for (index, scenario) in selection.scenarios.into_iter().enumerate() {
            if let Some(observer) = self.observer {
                observer.scenario_started(scenario.name(), index, total);
            }
            let outcome = self.run_scenario(scenario, &suite.plan).await;
            if let Some(observer) = self.observer {
                observer.scenario_finished(&outcome);
            }
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    async fn run_scenario(
        &self,
        scenario: &dyn Scenario,
        suite_plan: &CapturePlan,
    ) -> ScenarioOutcome {
        let name = scenario.name().to_string();
        let plan = scenario.plan(suite_plan);
        let start = Instant::now();
        info!(scenario = %name, "capturing");

        let mut page = match self.launcher.launch(&plan.context_options()).await {
            Ok(page) => page,
            Err(e) => {
                error!(scenario = %name, error = %e, "browser launch failed");
                return ScenarioOutcome {
                    name,
                    error: Some(e.to_string()),
                    artifact: ArtifactStatus::Missing(format!("browser launch failed: {e}")),
                    elapsed: start.elapsed(),
                };
            }
        };

        let error = match self.drive(scenario, &plan, page.as_mut()).await {
            Ok(()) => None,
            Err(e) => {
                error!(
                    scenario = %name,
                    description = scenario.description(),
                    error = %e,
                    "scenario failed"
                );
                Some(e.to_string())
            }
        };

        let target = plan.artifact_path(&scenario.artifact_name());
        let artifact = capture(&plan, page.as_mut(), &target).await;
        match &artifact {
            ArtifactStatus::Written(path) => {
                info!(scenario = %name, path = %path.display(), "saved");
            }
            ArtifactStatus::Missing(reason) => {
                warn!(scenario = %name, reason = %reason, "artifact not produced");
            }
        }

        ScenarioOutcome {
            name,
            error,
            artifact,
            elapsed: start.elapsed(),
        }
    }

    async fn drive(
        &self,
        scenario: &dyn Scenario,
        plan: &CapturePlan,
        page: &mut dyn PageDriver,
    ) -> DashcamResult<()> {
        if let (Some(stub), InstallTiming::BeforeLoad) = (&plan.stub, plan.install) {
            page.add_init_script(&stub.script(InstallTiming::BeforeLoad))
                .await?;
        }
        page.navigate(&self.document_url).await?;
        if let (Some(stub), InstallTiming::AfterLoad) = (&plan.stub, plan.install) {
            page.execute_js(&stub.script(InstallTiming::AfterLoad))
                .await?;
        }
        if plan.overlay {
            page.execute_js(&overlay_script()).await?;
        }
        let mut director = Director::with_timing(page, plan.timing);
        scenario.run(&mut director).await
    }
}

/// Capture the artifact and close the page
async fn capture(plan: &CapturePlan, page: &mut dyn PageDriver, target: &Path) -> ArtifactStatus {
    match plan.kind {
        CaptureKind::Screenshot => {
            let status = match page.screenshot().await {
                Ok(bytes) => match tokio::fs::write(target, bytes).await {
                    Ok(()) => ArtifactStatus::Written(target.to_path_buf()),
                    Err(e) => {
                        ArtifactStatus::Missing(format!("cannot write {}: {e}", target.display()))
                    }
                },
                Err(e) => ArtifactStatus::Missing(e.to_string()),
            };
            if let Err(e) = page.close().await {
                warn!(error = %e, "browser teardown failed");
            }
            status
        }
        CaptureKind::Video => match page.close().await {
            Ok(Some(raw)) => match replace_file(&raw, target).await {
                Ok(()) => ArtifactStatus::Written(target.to_path_buf()),
                Err(e) => ArtifactStatus::Missing(format!("cannot move recording: {e}")),
            },
            Ok(None) => ArtifactStatus::Missing("video file not found".to_string()),
            Err(e) => ArtifactStatus::Missing(e.to_string()),
        },
    }
}

/// Move `from` to `to`, replacing any existing file
async fn replace_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if tokio::fs::try_exists(to).await? {
        tokio::fs::remove_file(to).await?;
    }
    tokio::fs::rename(from, to).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod plan_tests {
        use super::*;

        #[test]
        fn test_artifact_paths() {
            let shots = CapturePlan::screenshots("verification", Viewport::HD);
            assert_eq!(
                shots.artifact_path("all_widgets"),
                PathBuf::from("verification/all_widgets.png")
            );
            let videos = CapturePlan::videos("videos", Viewport::HD, 25);
            assert_eq!(
                videos.artifact_path("clock"),
                PathBuf::from("videos/clock.webm")
            );
        }

        #[test]
        fn test_context_options() {
            let shots = CapturePlan::screenshots("out", Viewport::FULL_HD);
            assert_eq!(shots.context_options().video, None);
            let videos = CapturePlan::videos("videos", Viewport::HD, 30);
            let video = videos.context_options().video.unwrap();
            assert_eq!(video.dir, PathBuf::from("videos"));
            assert_eq!(video.size, Viewport::HD);
            assert_eq!(video.fps, 30);
        }

        #[test]
        fn test_stub_builders() {
            let plan = CapturePlan::screenshots("out", Viewport::HD)
                .with_stub(BackendStub::widget_gallery(), InstallTiming::BeforeLoad);
            assert_eq!(plan.install, InstallTiming::BeforeLoad);
            assert!(plan.stub.is_some());
            assert!(plan.without_stub().stub.is_none());
        }
    }

    mod report_tests {
        use super::*;

        fn outcome(error: Option<&str>, written: bool) -> ScenarioOutcome {
            ScenarioOutcome {
                name: "x".to_string(),
                error: error.map(str::to_string),
                artifact: if written {
                    ArtifactStatus::Written(PathBuf::from("x.png"))
                } else {
                    ArtifactStatus::Missing("gone".to_string())
                },
                elapsed: Duration::ZERO,
            }
        }

        #[test]
        fn test_success_needs_artifact_and_no_error() {
            assert!(outcome(None, true).succeeded());
            assert!(!outcome(Some("boom"), true).succeeded());
            assert!(!outcome(None, false).succeeded());
        }

        #[test]
        fn test_report_counts() {
            let report = CaptureReport {
                outcomes: vec![
                    outcome(None, true),
                    outcome(Some("boom"), true),
                    outcome(None, false),
                ],
                unknown: vec![],
            };
            assert_eq!(report.written(), 2);
            assert_eq!(report.failures().count(), 1);
            assert!(!report.all_succeeded());
        }
    }

    mod file_tests {
        use super::*;

        #[tokio::test]
        async fn test_replace_file_overwrites() {
            let dir = tempfile::tempdir().unwrap();
            let raw = dir.path().join("raw.webm");
            let target = dir.path().join("clock.webm");
            std::fs::write(&target, b"old").unwrap();
            std::fs::write(&raw, b"new").unwrap();
            replace_file(&raw, &target).await.unwrap();
            assert_eq!(std::fs::read(&target).unwrap(), b"new");
            assert!(!raw.exists());
        }
    }
}
