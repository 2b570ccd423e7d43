//! Built-in scenario suites.
//!
//! | Suite        | Capture           | Stub                    | Output                      |
//! |--------------|-------------------|-------------------------|-----------------------------|
//! | recordings   | video, 1280x720   | demo, after load        | `videos/<name>.webm`        |
//! | comparisons  | still, 1920x1080  | dashboards only         | `<type>_comparison.png`     |
//! | demo         | video, 1280x720   | live session            | `videos/demo_recording.webm`|
//! | verification | still, 1280x720   | per check               | `verification/*.png`        |

pub mod comparison;
pub mod demo;
pub mod system;
pub mod verify;
pub mod widgets;

pub use comparison::{ComparisonLayout, WidgetComparison};
pub use demo::DemoRecording;
pub use system::SystemTour;
pub use verify::{AllWidgetsCheck, GridLayout, LiveSessionCheck, SoundCheck, WatermarkCheck};
pub use widgets::WidgetTour;

use crate::capture::{CapturePlan, Suite};
use crate::config::{CaptureConfig, Viewport};
use crate::result::DashcamResult;
use crate::scenario::{ScenarioRegistry, WidgetKind};
use crate::stub::{BackendStub, InstallTiming};

/// Recorded widget and system tours, with the cinematic overlay
pub fn recordings(config: &CaptureConfig) -> DashcamResult<Suite> {
    let mut scenarios = ScenarioRegistry::new();
    for kind in widgets::TOURED {
        scenarios.register(Box::new(WidgetTour::new(kind)))?;
    }
    for tour in SystemTour::ALL {
        scenarios.register(Box::new(tour))?;
    }
    Ok(Suite {
        name: "recordings",
        plan: CapturePlan::videos(&config.video_dir, Viewport::HD, config.fps)
            .with_stub(BackendStub::demo(&config.session_code), InstallTiming::AfterLoad)
            .with_overlay(true),
        scenarios,
    })
}

/// Front/back comparison stills for every widget
pub fn comparisons(config: &CaptureConfig) -> DashcamResult<Suite> {
    let mut scenarios = ScenarioRegistry::new();
    for kind in WidgetKind::ALL {
        scenarios.register(Box::new(WidgetComparison::new(kind)))?;
    }
    Ok(Suite {
        name: "comparisons",
        plan: CapturePlan::screenshots(&config.comparison_dir, Viewport::FULL_HD)
            .with_stub(BackendStub::dashboards_only(), InstallTiming::AfterLoad),
        scenarios,
    })
}

/// The live-session demo video
pub fn demo(config: &CaptureConfig) -> DashcamResult<Suite> {
    let still = config.verification_dir.join("demo_screenshot.png");
    Ok(Suite {
        name: "demo",
        plan: CapturePlan::videos(&config.video_dir, Viewport::HD, config.fps).with_stub(
            BackendStub::live_session(&config.session_code),
            InstallTiming::AfterLoad,
        ),
        scenarios: ScenarioRegistry::new().with(DemoRecording::new(still))?,
    })
}

/// Verification stills
pub fn verification(config: &CaptureConfig) -> DashcamResult<Suite> {
    let scenarios = ScenarioRegistry::new()
        .with(WatermarkCheck)?
        .with(SoundCheck)?
        .with(LiveSessionCheck)?
        .with(AllWidgetsCheck)?;
    Ok(Suite {
        name: "verification",
        plan: CapturePlan::screenshots(&config.verification_dir, Viewport::HD),
        scenarios,
    })
}

/// Every suite, in CLI listing order
pub fn all(config: &CaptureConfig) -> DashcamResult<Vec<Suite>> {
    Ok(vec![
        recordings(config)?,
        comparisons(config)?,
        demo(config)?,
        verification(config)?,
    ])
}
