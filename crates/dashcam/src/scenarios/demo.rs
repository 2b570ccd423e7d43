//! Product demo: a live session with a clock, recorded end to end.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::director::Director;
use crate::locator::Locator;
use crate::result::DashcamResult;
use crate::scenario::{Scenario, WidgetKind};

/// Records the demo video and grabs a still half-way through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRecording {
    screenshot_path: PathBuf,
}

impl DemoRecording {
    /// Demo writing its still to `screenshot_path`
    pub fn new(screenshot_path: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_path: screenshot_path.into(),
        }
    }

    /// Where the still goes
    #[must_use]
    pub fn screenshot_path(&self) -> &Path {
        &self.screenshot_path
    }
}

async fn open_session_menu(d: &mut Director<'_>) -> DashcamResult<()> {
    d.click_direct(&Locator::css("#btn-start-session")).await?;
    d.wait_visible(&Locator::css("#session-menu")).await?;
    Ok(())
}

/// Clock with its interaction toggle switched on
async fn interact_with_clock(d: &mut Director<'_>) -> DashcamResult<()> {
    let clock = d.spawn(WidgetKind::Clock).await?;
    d.wait(2000).await;
    d.click_direct(&clock.locator(".btn-settings")).await?;
    d.wait(1000).await;

    let interact = clock.locator(".inp-interact");
    if d.is_visible(&interact).await? {
        d.click_direct(&interact).await?;
        d.wait(1000).await;
    }
    Ok(())
}

#[async_trait]
impl Scenario for DemoRecording {
    fn name(&self) -> &str {
        "demo"
    }

    fn description(&self) -> &str {
        "Live session demo: start, clock interaction, pause"
    }

    fn artifact_name(&self) -> String {
        "demo_recording".to_string()
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        open_session_menu(d).await?;
        d.click_direct(&Locator::css("#btn-menu-start-session"))
            .await?;
        d.wait_visible(&Locator::css("#session-indicator")).await?;
        info!("session started");

        if let Err(e) = interact_with_clock(d).await {
            warn!(error = %e, "clock interaction failed, continuing");
        }

        d.screenshot_to(&self.screenshot_path).await?;

        open_session_menu(d).await?;
        d.click_direct(&Locator::css("#btn-menu-pause")).await?;
        d.wait(1000).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{CallLog, MockBehavior, MockDriver};

    async fn run(demo: &DemoRecording, behavior: MockBehavior) -> (DashcamResult<()>, Vec<String>) {
        let mut driver = MockDriver::with_behavior(behavior, CallLog::default());
        let result = {
            let mut director = Director::new(&mut driver);
            demo.run(&mut director).await
        };
        (result, driver.history())
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_takes_still_and_pauses() {
        let dir = tempfile::tempdir().unwrap();
        let demo = DemoRecording::new(dir.path().join("verification/demo_screenshot.png"));
        let (result, history) = run(&demo, MockBehavior::default()).await;
        result.unwrap();
        assert!(demo.screenshot_path().exists());

        let shot = history.iter().position(|c| c == "screenshot").unwrap();
        let pause = history
            .iter()
            .position(|c| c.contains("#btn-menu-pause"))
            .unwrap();
        assert!(shot < pause);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let demo = DemoRecording::new(dir.path().join("demo.png"));
        let behavior = MockBehavior {
            failing: vec!["spawnWidget".into()],
            ..MockBehavior::default()
        };
        let (result, history) = run(&demo, behavior).await;
        result.unwrap();
        assert!(history.iter().any(|c| c == "screenshot"));
    }

    #[test]
    fn test_names() {
        let demo = DemoRecording::new("x.png");
        assert_eq!(demo.name(), "demo");
        assert_eq!(demo.artifact_name(), "demo_recording");
    }
}
