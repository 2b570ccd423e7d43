//! Director: paced, human-looking interactions for recordings.
//!
//! Every primitive wraps a page action with fixed waits so that viewers can
//! follow the cursor. The waits line up with the dashboard's CSS animations
//! (the camera transition is 1.2 s, card flips are 0.6 s).

use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::Viewport;
use crate::driver::{DialogResponse, Key, MouseEvent, PageDriver};
use crate::locator::{
    js_string, BoundingBox, ElementAction, ElementProbe, Locator, Point, WaitState,
    DEFAULT_TIMEOUT_MS,
};
use crate::overlay::{CameraShot, ZoomPolicy};
use crate::result::DashcamResult;
use crate::scenario::WidgetKind;

/// Fixed delays and step counts used by the director
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Interpolated steps for `move_to`
    pub move_steps: u32,
    /// Pause between arriving and clicking
    pub pre_click: Duration,
    /// Pause after a click
    pub post_click: Duration,
    /// Pause between typed characters
    pub key_delay: Duration,
    /// Pause after typing
    pub post_type: Duration,
    /// Pause after a fill
    pub post_fill: Duration,
    /// Pause after a key press
    pub post_press: Duration,
    /// Pause before measuring a widget to zoom on
    pub pre_zoom: Duration,
    /// Pause for the camera transition
    pub camera_settle: Duration,
    /// Default element wait
    pub element_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            move_steps: 30,
            pre_click: Duration::from_millis(100),
            post_click: Duration::from_millis(300),
            key_delay: Duration::from_millis(100),
            post_type: Duration::from_millis(500),
            post_fill: Duration::from_millis(300),
            post_press: Duration::from_millis(300),
            pre_zoom: Duration::from_millis(500),
            camera_settle: Duration::from_millis(1200),
            element_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Scripted interaction over one page
pub struct Director<'a> {
    page: &'a mut dyn PageDriver,
    timing: Timing,
    zoom: ZoomPolicy,
    mouse: Point,
}

impl<'a> Director<'a> {
    /// Direct a page with default timing
    pub fn new(page: &'a mut dyn PageDriver) -> Self {
        Self::with_timing(page, Timing::default())
    }

    /// Direct a page with custom timing
    pub fn with_timing(page: &'a mut dyn PageDriver, timing: Timing) -> Self {
        Self {
            page,
            timing,
            zoom: ZoomPolicy::default(),
            mouse: Point::new(0.0, 0.0),
        }
    }

    /// Timing in use
    #[must_use]
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Last pointer position
    #[must_use]
    pub const fn mouse_position(&self) -> Point {
        self.mouse
    }

    /// The underlying page
    pub fn page(&self) -> &dyn PageDriver {
        &*self.page
    }

    /// Sleep for `ms` milliseconds
    pub async fn wait(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Evaluate a script in the page
    pub async fn evaluate(&self, script: &str) -> DashcamResult<Value> {
        self.page.execute_js(script).await
    }

    /// Move the pointer in `steps` interpolated moves
    pub async fn mouse_move(&mut self, to: Point, steps: u32) -> DashcamResult<()> {
        let steps = steps.max(1);
        let from = self.mouse;
        for i in 1..=steps {
            let point = from.lerp(to, f64::from(i) / f64::from(steps));
            self.page.dispatch_mouse(MouseEvent::moved(point)).await?;
        }
        self.mouse = to;
        Ok(())
    }

    /// Press the left button at the pointer
    pub async fn mouse_down(&self) -> DashcamResult<()> {
        self.page.dispatch_mouse(MouseEvent::pressed(self.mouse)).await
    }

    /// Release the left button at the pointer
    pub async fn mouse_up(&self) -> DashcamResult<()> {
        self.page.dispatch_mouse(MouseEvent::released(self.mouse)).await
    }

    /// Glide to the element's centre; no-op if it has no box
    pub async fn move_to(&mut self, locator: &Locator) -> DashcamResult<Option<Point>> {
        let Some(bbox) = locator.bounding_box(&*self.page).await? else {
            debug!(%locator, "move_to skipped, no box");
            return Ok(None);
        };
        let target = bbox.center();
        debug!(%locator, x = target.x, y = target.y, "move_to");
        self.mouse_move(target, self.timing.move_steps).await?;
        Ok(Some(target))
    }

    /// Click as soon as the element is visible, without pacing
    pub async fn click_direct(&mut self, locator: &Locator) -> DashcamResult<()> {
        locator
            .wait_for(&*self.page, WaitState::Visible, self.timing.element_timeout)
            .await?;
        let probe = locator
            .act(&*self.page, &ElementAction::ScrollIntoView)
            .await?;
        let target = probe
            .bounding_box
            .map_or(self.mouse, |bbox| bbox.center());
        if target != self.mouse {
            self.mouse_move(target, 1).await?;
        }
        self.mouse_down().await?;
        self.mouse_up().await
    }

    /// Move, pause, click, pause
    pub async fn click(&mut self, locator: &Locator) -> DashcamResult<()> {
        self.move_to(locator).await?;
        tokio::time::sleep(self.timing.pre_click).await;
        debug!(%locator, "click");
        self.click_direct(locator).await?;
        tokio::time::sleep(self.timing.post_click).await;
        Ok(())
    }

    /// Click, then type one character at a time
    pub async fn type_text(&mut self, locator: &Locator, text: &str) -> DashcamResult<()> {
        self.click(locator).await?;
        debug!(%locator, text, "type");
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            if ch == '\n' {
                self.page.press_key(Key::Enter).await?;
            } else {
                self.page.insert_text(ch.encode_utf8(&mut buf)).await?;
            }
            tokio::time::sleep(self.timing.key_delay).await;
        }
        tokio::time::sleep(self.timing.post_type).await;
        Ok(())
    }

    /// Move, pause, replace the element's value
    pub async fn fill(&mut self, locator: &Locator, text: &str) -> DashcamResult<()> {
        self.move_to(locator).await?;
        tokio::time::sleep(self.timing.pre_click).await;
        debug!(%locator, text, "fill");
        locator
            .wait_for(&*self.page, WaitState::Visible, self.timing.element_timeout)
            .await?;
        locator.act(&*self.page, &ElementAction::Clear).await?;
        if !text.is_empty() {
            self.page.insert_text(text).await?;
        }
        tokio::time::sleep(self.timing.post_fill).await;
        Ok(())
    }

    /// Move, focus, press a key
    pub async fn press(&mut self, locator: &Locator, key: Key) -> DashcamResult<()> {
        self.move_to(locator).await?;
        debug!(%locator, key = key.key(), "press");
        locator.act(&*self.page, &ElementAction::Focus).await?;
        self.page.press_key(key).await?;
        tokio::time::sleep(self.timing.post_press).await;
        Ok(())
    }

    /// Pan and zoom the camera onto a widget
    pub async fn zoom_to_widget(&mut self, locator: &Locator) -> DashcamResult<Option<CameraShot>> {
        tokio::time::sleep(self.timing.pre_zoom).await;
        let Some(bbox) = locator.bounding_box(&*self.page).await? else {
            debug!(%locator, "zoom skipped, no box");
            return Ok(None);
        };
        let shot = CameraShot::framing(&bbox, &self.zoom);
        debug!(%locator, scale = shot.scale, "zoom");
        self.page.execute_js(&shot.to_js()).await?;
        tokio::time::sleep(self.timing.camera_settle).await;
        Ok(Some(shot))
    }

    /// Return the camera to the identity view
    pub async fn reset_camera(&mut self) -> DashcamResult<()> {
        self.page.execute_js(&CameraShot::reset().to_js()).await?;
        tokio::time::sleep(self.timing.camera_settle).await;
        Ok(())
    }

    /// Call the application's `spawnWidget` without waiting
    pub async fn spawn_raw(&self, type_name: &str) -> DashcamResult<Value> {
        debug!(type_name, "spawn");
        self.page
            .execute_js(&format!("void spawnWidget({})", js_string(type_name)))
            .await
    }

    /// Spawn a widget and wait for its card
    pub async fn spawn(&self, kind: WidgetKind) -> DashcamResult<Locator> {
        self.spawn_raw(kind.type_name()).await?;
        let card = kind.card();
        card.wait_for(&*self.page, WaitState::Visible, self.timing.element_timeout)
            .await?;
        Ok(card)
    }

    /// Call `function` with the first match
    pub async fn eval_on(&self, locator: &Locator, function: &str) -> DashcamResult<ElementProbe> {
        locator
            .act(&*self.page, &ElementAction::Evaluate(function.to_string()))
            .await
    }

    /// Choose an option of a `<select>`
    pub async fn select_option(&self, locator: &Locator, value: &str) -> DashcamResult<()> {
        debug!(%locator, value, "select_option");
        locator
            .act(&*self.page, &ElementAction::SelectOption(value.to_string()))
            .await?;
        Ok(())
    }

    /// Wait until the first match is visible
    pub async fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> DashcamResult<ElementProbe> {
        locator
            .wait_for(&*self.page, WaitState::Visible, timeout)
            .await
    }

    /// Wait for visibility with the default timeout
    pub async fn wait_visible(&self, locator: &Locator) -> DashcamResult<ElementProbe> {
        self.wait_for(locator, self.timing.element_timeout).await
    }

    /// Whether the first match is visible now
    pub async fn is_visible(&self, locator: &Locator) -> DashcamResult<bool> {
        locator.is_visible(&*self.page).await
    }

    /// Rendered text of the first match
    pub async fn inner_text(&self, locator: &Locator) -> DashcamResult<String> {
        locator.inner_text(&*self.page).await
    }

    /// Box of the first match
    pub async fn bounding_box(&self, locator: &Locator) -> DashcamResult<Option<BoundingBox>> {
        locator.bounding_box(&*self.page).await
    }

    /// Answer the next dialog with `text`
    pub async fn accept_next_dialog(&self, text: &str) -> DashcamResult<()> {
        self.page
            .handle_next_dialog(DialogResponse::accept_with(text))
            .await
    }

    /// Resize the viewport
    pub async fn set_viewport(&mut self, viewport: Viewport) -> DashcamResult<()> {
        self.page.set_viewport(viewport).await
    }

    /// Save a screenshot, creating the parent directory
    pub async fn screenshot_to(&self, path: &Path) -> DashcamResult<()> {
        let bytes = self.page.screenshot().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        debug!(path = %path.display(), "screenshot saved");
        Ok(())
    }
}
