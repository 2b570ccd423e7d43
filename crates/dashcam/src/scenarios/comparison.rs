//! Side-by-side comparison shots: one widget's front and settings faces.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::config::Viewport;
use crate::director::Director;
use crate::locator::{Locator, Point, DEFAULT_TIMEOUT_MS};
use crate::result::DashcamResult;
use crate::scenario::{Scenario, WidgetKind};

/// Placement of the two comparison cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonLayout {
    /// Card width
    pub width: f64,
    /// Card height
    pub height: f64,
    /// Horizontal gap between the cards
    pub gap: f64,
    /// Stacking order of both cards
    pub z_index: u32,
}

impl Default for ComparisonLayout {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 400.0,
            gap: 40.0,
            z_index: 100,
        }
    }
}

impl ComparisonLayout {
    /// Top-left corners of both cards, centred in `viewport`
    #[must_use]
    pub fn positions(&self, viewport: Viewport) -> [Point; 2] {
        let top = (f64::from(viewport.height) - self.height) / 2.0;
        let left = (f64::from(viewport.width) - (2.0 * self.width + self.gap)) / 2.0;
        [
            Point::new(left, top),
            Point::new(left + self.width + self.gap, top),
        ]
    }

    /// Script placing `#widget-1` and `#widget-2`
    ///
    /// Centred against the live window size, the same way as
    /// [`Self::positions`].
    #[must_use]
    pub fn script(&self) -> String {
        format!(
            "(() => {{ \
               const w1 = document.getElementById('widget-1'); \
               const w2 = document.getElementById('widget-2'); \
               if (!w1 || !w2) return false; \
               const top = (window.innerHeight - {h}) / 2; \
               const left = (window.innerWidth - ({w} * 2 + {gap})) / 2; \
               for (const [el, x] of [[w1, left], [w2, left + {w} + {gap}]]) {{ \
                 el.style.width = '{w}px'; \
                 el.style.height = '{h}px'; \
                 el.style.left = x + 'px'; \
                 el.style.top = top + 'px'; \
                 el.style.zIndex = '{z}'; \
               }} \
               return true; \
             }})()",
            w = self.width,
            h = self.height,
            gap = self.gap,
            z = self.z_index,
        )
    }
}

/// Front and back of one widget in a single screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetComparison {
    kind: WidgetKind,
}

impl WidgetComparison {
    /// Comparison of `kind`
    #[must_use]
    pub const fn new(kind: WidgetKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Scenario for WidgetComparison {
    fn name(&self) -> &str {
        self.kind.type_name()
    }

    fn description(&self) -> &str {
        "Front and settings face side by side"
    }

    fn artifact_name(&self) -> String {
        format!("{}_comparison", self.kind.type_name())
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        d.spawn_raw(self.kind.type_name()).await?;
        d.spawn_raw(self.kind.type_name()).await?;
        d.evaluate(&ComparisonLayout::default().script()).await?;

        let settings = Locator::css("#widget-2 .btn-settings");
        match d
            .wait_for(&settings, Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .await
        {
            Ok(_) => match d.click_direct(&settings).await {
                // Card flip is 0.6 s
                Ok(()) => d.wait(1000).await,
                Err(e) => warn!(widget = %self.kind, error = %e, "settings click failed"),
            },
            Err(e) => warn!(widget = %self.kind, error = %e, "could not flip to settings"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{CallLog, MockBehavior, MockDriver};

    mod layout_tests {
        use super::*;

        #[test]
        fn test_positions_centre_pair_in_full_hd() {
            let [a, b] = ComparisonLayout::default().positions(Viewport::FULL_HD);
            assert_eq!(a, Point::new(440.0, 340.0));
            assert_eq!(b, Point::new(980.0, 340.0));
        }

        #[test]
        fn test_script_addresses_both_widgets() {
            let script = ComparisonLayout::default().script();
            assert!(script.contains("getElementById('widget-1')"));
            assert!(script.contains("getElementById('widget-2')"));
            assert!(script.contains("'500px'"));
            assert!(script.contains("zIndex = '100'"));
        }
    }

    mod scenario_tests {
        use super::*;

        async fn run(kind: WidgetKind, behavior: MockBehavior) -> (DashcamResult<()>, Vec<String>) {
            let mut driver = MockDriver::with_behavior(behavior, CallLog::default());
            let result = {
                let mut director = Director::new(&mut driver);
                WidgetComparison::new(kind).run(&mut director).await
            };
            (result, driver.history())
        }

        #[test]
        fn test_artifact_name() {
            assert_eq!(
                WidgetComparison::new(WidgetKind::Qr).artifact_name(),
                "qr_comparison"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_spawns_twice_then_flips() {
            let (result, history) = run(WidgetKind::Clock, MockBehavior::default()).await;
            result.unwrap();
            let spawns = history
                .iter()
                .filter(|c| *c == "execute_js:void spawnWidget(\"clock\")")
                .count();
            assert_eq!(spawns, 2);
            assert!(history.iter().any(|c| c.starts_with("mouse:Pressed")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_settings_button_still_succeeds() {
            let behavior = MockBehavior {
                missing: vec!["#widget-2 .btn-settings".into()],
                ..MockBehavior::default()
            };
            let start = tokio::time::Instant::now();
            let (result, history) = run(WidgetKind::Webcam, behavior).await;
            result.unwrap();
            assert!(start.elapsed() >= Duration::from_millis(DEFAULT_TIMEOUT_MS));
            assert!(!history.iter().any(|c| c.starts_with("mouse:Pressed")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_failed_settings_click_still_succeeds() {
            let behavior = MockBehavior {
                failing: vec!["scrollIntoView".into()],
                ..MockBehavior::default()
            };
            let (result, history) = run(WidgetKind::Clock, behavior).await;
            result.unwrap();
            assert!(history.iter().any(|c| c.contains("scrollIntoView")));
            assert!(!history.iter().any(|c| c.starts_with("mouse:Pressed")));
        }
    }
}
