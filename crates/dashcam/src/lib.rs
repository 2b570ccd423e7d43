//! Dashcam: scripted demo recordings of the classroom dashboard
//!
//! Drives the single-page dashboard in headless Chromium with its Apps
//! Script backend stubbed out, then captures a video or a screenshot per
//! scenario.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         DASHCAM pipeline                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │  Suite   │──►│ Orchestrator │──►│ Director │──►│ PageDriver│  │
//! │  │ (plans + │   │ (launch,     │   │ (paced   │   │ (CDP or   │  │
//! │  │ scenarios)│  │  stub, save) │   │  input)  │   │  mock)    │  │
//! │  └──────────┘   └──────────────┘   └──────────┘   └───────────┘  │
//! │        BackendStub + overlay scripts injected into the page       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dashcam::{scenarios, CaptureConfig, MockLauncher, Orchestrator};
//!
//! # async fn demo() -> dashcam::DashcamResult<()> {
//! let config = CaptureConfig::default();
//! let suite = scenarios::verification(&config)?;
//! let launcher = MockLauncher::new();
//! let report = Orchestrator::new(&launcher, config.document_url()?)
//!     .run(&suite, &[])
//!     .await?;
//! assert!(report.all_succeeded());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
pub mod browser;
pub mod capture;
pub mod config;
pub mod director;
pub mod driver;
pub mod locator;
pub mod overlay;
mod result;
pub mod scenario;
pub mod scenarios;
pub mod screencast;
pub mod stub;

#[cfg(feature = "browser")]
pub use browser::{ChromiumLauncher, ChromiumPage};
pub use capture::{
    ArtifactStatus, CaptureKind, CaptureObserver, CapturePlan, CaptureReport, Orchestrator,
    ScenarioOutcome, Suite,
};
pub use config::{file_url, CaptureConfig, VideoSettings, Viewport, CHROMIUM_PATH_ENV};
pub use director::{Director, Timing};
pub use driver::{
    CallLog, ContextOptions, DialogResponse, DriverLauncher, Key, MockBehavior, MockDriver,
    MockLauncher, MouseEvent, MouseEventKind, PageDriver, MOCK_PNG,
};
pub use locator::{BoundingBox, ElementAction, ElementProbe, Locator, Point, WaitState};
pub use overlay::{overlay_script, CameraShot, ZoomPolicy};
pub use result::{DashcamError, DashcamResult};
pub use scenario::{Scenario, ScenarioRegistry, Selection, WidgetKind};
pub use stub::{BackendStub, InstallTiming, Reply, DEFAULT_SESSION_CODE};

/// Prelude for writing scenarios
pub mod prelude {
    pub use super::director::{Director, Timing};
    pub use super::driver::Key;
    pub use super::locator::{Locator, Point};
    pub use super::result::{DashcamError, DashcamResult};
    pub use super::scenario::{Scenario, WidgetKind};
}
