//! Verification checks: screenshots that prove a feature renders.

use async_trait::async_trait;

use crate::capture::CapturePlan;
use crate::config::Viewport;
use crate::director::Director;
use crate::locator::{Locator, Point};
use crate::result::{DashcamError, DashcamResult};
use crate::scenario::{Scenario, WidgetKind};
use crate::stub::{BackendStub, InstallTiming};

/// Session code the live-session check expects on screen
pub const LIVE_SESSION_CODE: &str = "TEST12";

/// Viewport the widget gallery is captured at
pub const GALLERY_VIEWPORT: Viewport = Viewport::new(1500, 1600);

/// The page without any backend, to show the watermark
#[derive(Debug, Clone, Copy, Default)]
pub struct WatermarkCheck;

#[async_trait]
impl Scenario for WatermarkCheck {
    fn name(&self) -> &str {
        "watermark"
    }

    fn description(&self) -> &str {
        "Watermark renders without a backend"
    }

    fn artifact_name(&self) -> String {
        "watermark_verification".to_string()
    }

    fn plan(&self, suite: &CapturePlan) -> CapturePlan {
        suite.clone().without_stub()
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        d.wait(2000).await;
        Ok(())
    }
}

const FREEZE_METER: &str = "(() => { \
     const widget = document.querySelector('.widget[id^=\"widget-\"]'); \
     if (!widget) return false; \
     const overlay = widget.querySelector('.mic-overlay'); \
     if (overlay) overlay.style.display = 'none'; \
     const bar = widget.querySelector('.mic-bar'); \
     if (bar) { bar.style.height = '50%'; bar.classList.add('bg-yellow-400'); } \
     return true; \
   })()";

/// Noise meter with a frozen, half-full bar
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundCheck;

#[async_trait]
impl Scenario for SoundCheck {
    fn name(&self) -> &str {
        "sound"
    }

    fn description(&self) -> &str {
        "Noise meter renders its bar"
    }

    fn artifact_name(&self) -> String {
        "sound_verification".to_string()
    }

    fn plan(&self, suite: &CapturePlan) -> CapturePlan {
        suite
            .clone()
            .with_stub(BackendStub::inert(), InstallTiming::AfterLoad)
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        d.spawn(WidgetKind::Sound).await?;
        d.evaluate(FREEZE_METER).await?;
        d.wait(500).await;
        Ok(())
    }
}

const SHOW_PAUSED_STUDENT: &str = "(() => { \
     updateStudentView({ widgets: [], paused: true, polls: {} }); \
     document.getElementById('student-paused-overlay').classList.remove('hidden'); \
     return true; \
   })()";

const HIDE_PAUSED_STUDENT: &str =
    "void document.getElementById('student-paused-overlay').classList.add('hidden')";

/// Teacher and student views of a live session
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveSessionCheck;

impl LiveSessionCheck {
    async fn open_session_menu(d: &mut Director<'_>) -> DashcamResult<()> {
        d.click_direct(&Locator::css("#btn-start-session")).await?;
        d.wait_visible(&Locator::css("#session-menu")).await?;
        Ok(())
    }
}

#[async_trait]
impl Scenario for LiveSessionCheck {
    fn name(&self) -> &str {
        "live_session"
    }

    fn description(&self) -> &str {
        "Session code, paused overlay and interaction toggle"
    }

    fn artifact_name(&self) -> String {
        "verification".to_string()
    }

    fn plan(&self, suite: &CapturePlan) -> CapturePlan {
        suite.clone().with_stub(
            BackendStub::live_session(LIVE_SESSION_CODE),
            InstallTiming::AfterLoad,
        )
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        Self::open_session_menu(d).await?;
        d.click_direct(&Locator::css("#btn-menu-start-session"))
            .await?;
        let display = Locator::css("#session-code-display");
        d.wait_visible(&display).await?;
        let code = d.inner_text(&display).await?;
        if code.trim() != LIVE_SESSION_CODE {
            return Err(DashcamError::assertion(format!(
                "session code shows {code:?}, expected {LIVE_SESSION_CODE:?}"
            )));
        }

        Self::open_session_menu(d).await?;
        d.click_direct(&Locator::css("#btn-menu-pause")).await?;
        d.wait(500).await;

        d.evaluate(SHOW_PAUSED_STUDENT).await?;
        d.wait_visible(&Locator::css("#student-paused-overlay"))
            .await?;
        d.evaluate(HIDE_PAUSED_STUDENT).await?;

        let clock = d.spawn(WidgetKind::Clock).await?;
        d.click_direct(&clock.locator(".btn-settings")).await?;
        if !d.is_visible(&clock.locator(".inp-interact")).await? {
            return Err(DashcamError::assertion(
                "interaction toggle missing from clock settings",
            ));
        }
        Ok(())
    }
}

/// Grid the gallery is laid out on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Cards per row
    pub columns: usize,
    /// Distance between card origins
    pub pitch: f64,
    /// Offset of the first card
    pub margin: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            pitch: 350.0,
            margin: 50.0,
        }
    }
}

impl GridLayout {
    /// Top-left corner of the `index`th card
    #[must_use]
    pub fn position(&self, index: usize) -> Point {
        let columns = self.columns.max(1);
        let (row, col) = (index / columns, index % columns);
        Point::new(
            self.margin + col as f64 * self.pitch,
            self.margin + row as f64 * self.pitch,
        )
    }

    /// Script spawning `kinds` in order onto the grid
    #[must_use]
    pub fn script(&self, kinds: &[WidgetKind]) -> String {
        let placements: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let at = self.position(index);
                format!(
                    "[{}, {}, {}, {}]",
                    crate::locator::js_string(kind.type_name()),
                    at.x,
                    at.y,
                    100 + index
                )
            })
            .collect();
        format!(
            "(() => {{ \
               for (const [type, x, y, z] of [{}]) {{ \
                 const widget = window.spawnWidget(type); \
                 const el = widget && widget.el; \
                 if (!el) continue; \
                 el.style.left = x + 'px'; \
                 el.style.top = y + 'px'; \
                 el.style.zIndex = String(z); \
               }} \
               return true; \
             }})()",
            placements.join(", ")
        )
    }
}

/// Gallery order of every widget
pub const GALLERY: [WidgetKind; 14] = [
    WidgetKind::Clock,
    WidgetKind::Timer,
    WidgetKind::Traffic,
    WidgetKind::Text,
    WidgetKind::Checklist,
    WidgetKind::Random,
    WidgetKind::Dice,
    WidgetKind::Sound,
    WidgetKind::Drawing,
    WidgetKind::Qr,
    WidgetKind::Embed,
    WidgetKind::Timetable,
    WidgetKind::Poll,
    WidgetKind::Webcam,
];

/// Every widget at once on a tall page
#[derive(Debug, Clone, Copy, Default)]
pub struct AllWidgetsCheck;

#[async_trait]
impl Scenario for AllWidgetsCheck {
    fn name(&self) -> &str {
        "all_widgets"
    }

    fn description(&self) -> &str {
        "All fourteen widgets render together"
    }

    fn plan(&self, suite: &CapturePlan) -> CapturePlan {
        suite
            .clone()
            .with_stub(BackendStub::widget_gallery(), InstallTiming::BeforeLoad)
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        d.wait(1000).await;
        d.evaluate(&GridLayout::default().script(&GALLERY)).await?;
        d.wait(2000).await;
        d.set_viewport(GALLERY_VIEWPORT).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{CallLog, MockBehavior, MockDriver};

    async fn run(check: &dyn Scenario, behavior: MockBehavior) -> (DashcamResult<()>, Vec<String>) {
        let mut driver = MockDriver::with_behavior(behavior, CallLog::default());
        let result = {
            let mut director = Director::new(&mut driver);
            check.run(&mut director).await
        };
        (result, driver.history())
    }

    mod plan_tests {
        use super::*;

        fn suite_plan() -> CapturePlan {
            CapturePlan::screenshots("verification", Viewport::HD)
                .with_stub(BackendStub::demo("DEMO12"), InstallTiming::AfterLoad)
        }

        #[test]
        fn test_watermark_drops_stub() {
            assert!(WatermarkCheck.plan(&suite_plan()).stub.is_none());
        }

        #[test]
        fn test_gallery_installs_before_load() {
            let plan = AllWidgetsCheck.plan(&suite_plan());
            assert_eq!(plan.install, InstallTiming::BeforeLoad);
            assert_eq!(plan.stub, Some(BackendStub::widget_gallery()));
        }

        #[test]
        fn test_live_session_uses_test_code() {
            let plan = LiveSessionCheck.plan(&suite_plan());
            assert_eq!(plan.stub, Some(BackendStub::live_session(LIVE_SESSION_CODE)));
        }

        #[test]
        fn test_artifact_names() {
            assert_eq!(WatermarkCheck.artifact_name(), "watermark_verification");
            assert_eq!(SoundCheck.artifact_name(), "sound_verification");
            assert_eq!(LiveSessionCheck.artifact_name(), "verification");
            assert_eq!(AllWidgetsCheck.artifact_name(), "all_widgets");
        }
    }

    mod grid_tests {
        use super::*;

        #[test]
        fn test_grid_positions() {
            let grid = GridLayout::default();
            assert_eq!(grid.position(0), Point::new(50.0, 50.0));
            assert_eq!(grid.position(3), Point::new(1100.0, 50.0));
            assert_eq!(grid.position(4), Point::new(50.0, 400.0));
            assert_eq!(grid.position(13), Point::new(400.0, 1100.0));
        }

        #[test]
        fn test_script_lists_every_widget_in_order() {
            let script = GridLayout::default().script(&GALLERY);
            assert!(script.contains("[\"clock\", 50, 50, 100]"));
            assert!(script.contains("[\"webcam\", 400, 1100, 113]"));
            let sound = script.find("\"sound\"").unwrap();
            let drawing = script.find("\"drawing\"").unwrap();
            assert!(sound < drawing);
        }
    }

    mod check_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_live_session_rejects_wrong_code() {
            let behavior = MockBehavior {
                element_text: "NOPE99".into(),
                ..MockBehavior::default()
            };
            let (result, _) = run(&LiveSessionCheck, behavior).await;
            assert!(matches!(result, Err(DashcamError::AssertionFailed { .. })));
        }

        #[tokio::test(start_paused = true)]
        async fn test_live_session_passes_with_code_on_screen() {
            let behavior = MockBehavior {
                element_text: LIVE_SESSION_CODE.into(),
                ..MockBehavior::default()
            };
            let (result, history) = run(&LiveSessionCheck, behavior).await;
            result.unwrap();
            assert!(history.iter().any(|c| c.contains("updateStudentView")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_live_session_missing_toggle_fails() {
            let behavior = MockBehavior {
                element_text: LIVE_SESSION_CODE.into(),
                missing: vec![".inp-interact".into()],
                ..MockBehavior::default()
            };
            let (result, _) = run(&LiveSessionCheck, behavior).await;
            assert!(matches!(result, Err(DashcamError::AssertionFailed { .. })));
        }

        #[tokio::test(start_paused = true)]
        async fn test_all_widgets_resizes_last() {
            let (result, history) = run(&AllWidgetsCheck, MockBehavior::default()).await;
            result.unwrap();
            assert_eq!(history.last().map(String::as_str), Some("viewport:1500x1600"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_sound_freezes_meter() {
            let (result, history) = run(&SoundCheck, MockBehavior::default()).await;
            result.unwrap();
            assert!(history.iter().any(|c| c.contains("bg-yellow-400")));
        }
    }
}
