//! Page driver: the browser primitives every suite is built from.
//!
//! [`PageDriver`] is the seam between scenario code and the browser. The
//! Chromium implementation lives in [`crate::browser`]; [`MockDriver`] records
//! calls and answers scripts with canned element probes so directors,
//! scenarios and the orchestrator can be tested without a browser.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::{VideoSettings, Viewport};
use crate::locator::{BoundingBox, Point, PROBE_MARKER};
use crate::result::{DashcamError, DashcamResult};

/// Options for a fresh browser context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Page viewport
    pub viewport: Viewport,
    /// Record the page to video while it is open
    pub video: Option<VideoSettings>,
}

impl ContextOptions {
    /// Context with a viewport and no recording
    #[must_use]
    pub const fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            video: None,
        }
    }

    /// Record the context to video
    #[must_use]
    pub fn with_video(mut self, video: VideoSettings) -> Self {
        self.video = Some(video);
        self
    }
}

/// Kind of mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    /// Pointer moved
    Moved,
    /// Left button pressed
    Pressed,
    /// Left button released
    Released,
}

/// A mouse event at a viewport point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Event kind
    pub kind: MouseEventKind,
    /// Position
    pub point: Point,
}

impl MouseEvent {
    /// Pointer move
    #[must_use]
    pub const fn moved(point: Point) -> Self {
        Self {
            kind: MouseEventKind::Moved,
            point,
        }
    }

    /// Left button down
    #[must_use]
    pub const fn pressed(point: Point) -> Self {
        Self {
            kind: MouseEventKind::Pressed,
            point,
        }
    }

    /// Left button up
    #[must_use]
    pub const fn released(point: Point) -> Self {
        Self {
            kind: MouseEventKind::Released,
            point,
        }
    }
}

/// Named keys the scenarios press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Enter / Return
    Enter,
    /// Tab
    Tab,
    /// Escape
    Escape,
    /// Backspace
    Backspace,
}

impl Key {
    /// Parse a key name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Enter" | "Return" => Some(Self::Enter),
            "Tab" => Some(Self::Tab),
            "Escape" | "Esc" => Some(Self::Escape),
            "Backspace" => Some(Self::Backspace),
            _ => None,
        }
    }

    /// DOM `key` value
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::Escape => "Escape",
            Self::Backspace => "Backspace",
        }
    }

    /// DOM `code` value
    #[must_use]
    pub const fn code(self) -> &'static str {
        self.key()
    }

    /// Windows virtual key code
    #[must_use]
    pub const fn virtual_key_code(self) -> i64 {
        match self {
            Self::Enter => 13,
            Self::Tab => 9,
            Self::Escape => 27,
            Self::Backspace => 8,
        }
    }

    /// Text the key inserts, if any
    #[must_use]
    pub const fn text(self) -> Option<&'static str> {
        match self {
            Self::Enter => Some("\r"),
            Self::Tab | Self::Escape | Self::Backspace => None,
        }
    }
}

/// How to answer the next JavaScript dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogResponse {
    /// Accept (OK) or dismiss (Cancel)
    pub accept: bool,
    /// Text typed into a prompt
    pub prompt_text: Option<String>,
}

impl DialogResponse {
    /// Accept, answering a prompt with `text`
    #[must_use]
    pub fn accept_with(text: impl Into<String>) -> Self {
        Self {
            accept: true,
            prompt_text: Some(text.into()),
        }
    }

    /// Accept without text
    #[must_use]
    pub const fn accept() -> Self {
        Self {
            accept: true,
            prompt_text: None,
        }
    }
}

/// Browser page primitives
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for load
    async fn navigate(&mut self, url: &str) -> DashcamResult<()>;

    /// Register a script that runs before any page script on every load
    async fn add_init_script(&mut self, source: &str) -> DashcamResult<()>;

    /// Evaluate a JavaScript expression and return its JSON value
    async fn execute_js(&self, script: &str) -> DashcamResult<Value>;

    /// Dispatch a mouse event
    async fn dispatch_mouse(&self, event: MouseEvent) -> DashcamResult<()>;

    /// Insert text into the focused element as if typed
    async fn insert_text(&self, text: &str) -> DashcamResult<()>;

    /// Press and release a key
    async fn press_key(&self, key: Key) -> DashcamResult<()>;

    /// Resize the viewport
    async fn set_viewport(&mut self, viewport: Viewport) -> DashcamResult<()>;

    /// Capture the viewport as PNG bytes
    async fn screenshot(&self) -> DashcamResult<Vec<u8>>;

    /// Answer the next dialog the page opens
    async fn handle_next_dialog(&self, response: DialogResponse) -> DashcamResult<()>;

    /// Close the browser; returns the finalized recording, if any
    async fn close(&mut self) -> DashcamResult<Option<PathBuf>>;
}

/// Starts a fresh, isolated browser page
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Launch a browser and open one page
    async fn launch(&self, options: &ContextOptions) -> DashcamResult<Box<dyn PageDriver>>;
}

/// Shared call history of mock drivers
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Canned behaviour for [`MockDriver`]
#[derive(Debug, Clone)]
pub struct MockBehavior {
    /// Box reported for every element found
    pub element_box: BoundingBox,
    /// Text reported for every element found
    pub element_text: String,
    /// Probes whose script contains any of these report nothing found
    pub missing: Vec<String>,
    /// Scripts containing any of these fail
    pub failing: Vec<String>,
    /// Write a recording on close when video is enabled
    pub produce_video: bool,
    /// Fail every launch
    pub fail_launch: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            element_box: BoundingBox::new(100.0, 100.0, 280.0, 160.0),
            element_text: String::new(),
            missing: Vec::new(),
            failing: Vec::new(),
            produce_video: true,
            fail_launch: false,
        }
    }
}

/// Bytes returned by [`MockDriver::screenshot`]
pub const MOCK_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock";

/// Mock driver for unit testing
#[derive(Debug)]
pub struct MockDriver {
    behavior: MockBehavior,
    video: Option<VideoSettings>,
    log: CallLog,
    closed: bool,
}

impl MockDriver {
    /// Create a mock with default behaviour and its own log
    #[must_use]
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::default(), CallLog::default())
    }

    /// Create a mock writing into a shared log
    #[must_use]
    pub fn with_behavior(behavior: MockBehavior, log: CallLog) -> Self {
        Self {
            behavior,
            video: None,
            log,
            closed: false,
        }
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Check if a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        if let Ok(mut log) = self.log.lock() {
            log.push(call);
        }
    }

    fn probe_reply(&self, script: &str) -> Value {
        if self.behavior.missing.iter().any(|m| script.contains(m)) {
            return json!({ "found": false, "visible": false, "count": 0 });
        }
        let b = self.behavior.element_box;
        json!({
            "found": true,
            "visible": true,
            "count": 1,
            "box": { "x": b.x, "y": b.y, "width": b.width, "height": b.height },
            "text": self.behavior.element_text,
            "value": ""
        })
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> DashcamResult<()> {
        self.record(format!("navigate:{url}"));
        Ok(())
    }

    async fn add_init_script(&mut self, source: &str) -> DashcamResult<()> {
        self.record(format!("init_script:{source}"));
        Ok(())
    }

    async fn execute_js(&self, script: &str) -> DashcamResult<Value> {
        self.record(format!("execute_js:{script}"));
        if self.behavior.failing.iter().any(|f| script.contains(f)) {
            return Err(DashcamError::script("mock script failure"));
        }
        if script.starts_with(PROBE_MARKER) {
            Ok(self.probe_reply(script))
        } else {
            Ok(Value::Bool(true))
        }
    }

    async fn dispatch_mouse(&self, event: MouseEvent) -> DashcamResult<()> {
        self.record(format!(
            "mouse:{:?}:{:.1},{:.1}",
            event.kind, event.point.x, event.point.y
        ));
        Ok(())
    }

    async fn insert_text(&self, text: &str) -> DashcamResult<()> {
        self.record(format!("insert_text:{text}"));
        Ok(())
    }

    async fn press_key(&self, key: Key) -> DashcamResult<()> {
        self.record(format!("press_key:{}", key.key()));
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> DashcamResult<()> {
        self.record(format!("viewport:{}x{}", viewport.width, viewport.height));
        Ok(())
    }

    async fn screenshot(&self) -> DashcamResult<Vec<u8>> {
        self.record("screenshot".to_string());
        Ok(MOCK_PNG.to_vec())
    }

    async fn handle_next_dialog(&self, response: DialogResponse) -> DashcamResult<()> {
        self.record(format!(
            "dialog:{}:{}",
            response.accept,
            response.prompt_text.unwrap_or_default()
        ));
        Ok(())
    }

    async fn close(&mut self) -> DashcamResult<Option<PathBuf>> {
        if self.closed {
            return Ok(None);
        }
        self.closed = true;
        self.record("close".to_string());
        match &self.video {
            Some(video) if self.behavior.produce_video => {
                std::fs::create_dir_all(&video.dir)?;
                let path = video
                    .dir
                    .join(format!("{}.webm", uuid::Uuid::new_v4().simple()));
                std::fs::write(&path, b"\x1aE\xdf\xa3mock")?;
                Ok(Some(path))
            }
            _ => Ok(None),
        }
    }
}

/// Launcher handing out [`MockDriver`]s that share one call log
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    behavior: MockBehavior,
    log: CallLog,
    launches: Arc<Mutex<Vec<ContextOptions>>>,
}

impl MockLauncher {
    /// Create a launcher with default behaviour
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a launcher with custom behaviour
    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    /// Calls made by every driver launched so far
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Options of every launch so far
    #[must_use]
    pub fn launches(&self) -> Vec<ContextOptions> {
        self.launches
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DriverLauncher for MockLauncher {
    async fn launch(&self, options: &ContextOptions) -> DashcamResult<Box<dyn PageDriver>> {
        if let Ok(mut launches) = self.launches.lock() {
            launches.push(options.clone());
        }
        if self.behavior.fail_launch {
            return Err(DashcamError::BrowserLaunch {
                message: "mock launch failure".to_string(),
            });
        }
        let mut driver = MockDriver::with_behavior(self.behavior.clone(), Arc::clone(&self.log));
        driver.video = options.video.clone();
        driver.record(format!(
            "launch:{}x{}",
            options.viewport.width, options.viewport.height
        ));
        Ok(Box::new(driver))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod key_tests {
        use super::*;

        #[test]
        fn test_from_name() {
            assert_eq!(Key::from_name("Enter"), Some(Key::Enter));
            assert_eq!(Key::from_name("Esc"), Some(Key::Escape));
            assert_eq!(Key::from_name("F13"), None);
        }

        #[test]
        fn test_enter_inserts_carriage_return() {
            assert_eq!(Key::Enter.text(), Some("\r"));
            assert_eq!(Key::Enter.virtual_key_code(), 13);
            assert_eq!(Key::Tab.text(), None);
        }
    }

    mod mock_driver_tests {
        use super::*;

        #[tokio::test]
        async fn test_records_calls() {
            let mut driver = MockDriver::new();
            driver.navigate("file:///index.html").await.unwrap();
            driver.press_key(Key::Enter).await.unwrap();
            assert!(driver.was_called("navigate:file:///index.html"));
            assert!(driver.was_called("press_key:Enter"));
            assert!(!driver.was_called("screenshot"));
        }

        #[tokio::test]
        async fn test_probe_reply_uses_box() {
            let driver = MockDriver::new();
            let reply = driver
                .execute_js(&format!("{PROBE_MARKER}(() => 1)()"))
                .await
                .unwrap();
            assert_eq!(reply["found"], json!(true));
            assert_eq!(reply["box"]["width"], json!(280.0));
        }

        #[tokio::test]
        async fn test_missing_and_failing() {
            let behavior = MockBehavior {
                missing: vec!["canvas".into()],
                failing: vec!["boom".into()],
                ..MockBehavior::default()
            };
            let driver = MockDriver::with_behavior(behavior, CallLog::default());
            let reply = driver
                .execute_js(&format!("{PROBE_MARKER} canvas"))
                .await
                .unwrap();
            assert_eq!(reply["found"], json!(false));
            assert!(driver.execute_js("boom()").await.is_err());
        }

        #[tokio::test]
        async fn test_close_writes_video_once() {
            let dir = tempfile::tempdir().unwrap();
            let launcher = MockLauncher::new();
            let options = ContextOptions::new(Viewport::HD)
                .with_video(VideoSettings::new(dir.path(), Viewport::HD));
            let mut page = launcher.launch(&options).await.unwrap();
            let video = page.close().await.unwrap().unwrap();
            assert!(video.exists());
            assert_eq!(video.extension().unwrap(), "webm");
            assert!(page.close().await.unwrap().is_none());
        }

        #[tokio::test]
        async fn test_launcher_shares_log() {
            let launcher = MockLauncher::new();
            let mut first = launcher
                .launch(&ContextOptions::new(Viewport::HD))
                .await
                .unwrap();
            first.navigate("a").await.unwrap();
            let mut second = launcher
                .launch(&ContextOptions::new(Viewport::FULL_HD))
                .await
                .unwrap();
            second.navigate("b").await.unwrap();
            let history = launcher.history();
            assert_eq!(
                history,
                vec!["launch:1280x720", "navigate:a", "launch:1920x1080", "navigate:b"]
            );
            assert_eq!(launcher.launches().len(), 2);
        }

        #[tokio::test]
        async fn test_failed_launch() {
            let launcher = MockLauncher::with_behavior(MockBehavior {
                fail_launch: true,
                ..MockBehavior::default()
            });
            let result = launcher.launch(&ContextOptions::new(Viewport::HD)).await;
            assert!(matches!(result, Err(DashcamError::BrowserLaunch { .. })));
        }
    }
}
