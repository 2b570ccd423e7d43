//! Chromium page driver over CDP.
//!
//! Each [`ChromiumLauncher::launch`] starts its own browser process with one
//! page. Nothing is shared between launches: cookies, DOM and recorder all
//! die with [`PageDriver::close`].

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, InsertTextParams, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::{
    AddScriptToEvaluateOnNewDocumentParams, CaptureScreenshotFormat, CaptureScreenshotParams,
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::handler::viewport::Viewport as CdpViewport;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::{CaptureConfig, Viewport};
use crate::driver::{
    ContextOptions, DialogResponse, DriverLauncher, Key, MouseEvent, MouseEventKind, PageDriver,
};
use crate::result::{DashcamError, DashcamResult};
use crate::screencast::ScreencastRecorder;

/// Launches headless (or headed) Chromium
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    headless: bool,
    sandbox: bool,
    chrome_path: Option<PathBuf>,
}

impl ChromiumLauncher {
    /// Headless, sandboxed, auto-detected executable
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
        }
    }

    /// Take browser settings from a capture config
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            headless: config.headless,
            sandbox: config.sandbox,
            chrome_path: config.chrome_path.clone(),
        }
    }

    fn browser_config(&self, viewport: Viewport) -> DashcamResult<CdpConfig> {
        let mut builder = CdpConfig::builder()
            .window_size(viewport.width, viewport.height)
            .viewport(CdpViewport {
                width: viewport.width,
                height: viewport.height,
                ..CdpViewport::default()
            });

        if !self.headless {
            builder = builder.with_head();
        }

        if !self.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder
            .build()
            .map_err(|message| DashcamError::BrowserLaunch { message })
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self, options: &ContextOptions) -> DashcamResult<Box<dyn PageDriver>> {
        let cdp_config = self.browser_config(options.viewport)?;
        let (mut browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| DashcamError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let pump = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(&mut browser, &pump).await;
                return Err(DashcamError::Page {
                    message: e.to_string(),
                });
            }
        };

        let recorder = match &options.video {
            Some(video) => match ScreencastRecorder::start(page.clone(), video.clone()).await {
                Ok(recorder) => Some(recorder),
                Err(e) => {
                    shutdown(&mut browser, &pump).await;
                    return Err(e);
                }
            },
            None => None,
        };

        debug!(
            width = options.viewport.width,
            height = options.viewport.height,
            recording = recorder.is_some(),
            "browser launched"
        );

        Ok(Box::new(ChromiumPage {
            browser,
            page,
            pump,
            recorder,
            dialogs: Mutex::new(Vec::new()),
            button_down: AtomicBool::new(false),
            closed: false,
        }))
    }
}

/// One page in its own Chromium process
pub struct ChromiumPage {
    browser: CdpBrowser,
    page: CdpPage,
    pump: JoinHandle<()>,
    recorder: Option<ScreencastRecorder>,
    dialogs: Mutex<Vec<JoinHandle<()>>>,
    button_down: AtomicBool,
    closed: bool,
}

impl std::fmt::Debug for ChromiumPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromiumPage")
            .field("recording", &self.recorder.is_some())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn input_error(e: impl std::fmt::Display) -> DashcamError {
    DashcamError::input(e.to_string())
}

fn page_error(e: impl std::fmt::Display) -> DashcamError {
    DashcamError::Page {
        message: e.to_string(),
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> DashcamResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| DashcamError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn add_init_script(&mut self, source: &str) -> DashcamResult<()> {
        self.page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(source))
            .await
            .map_err(|e| DashcamError::script(e.to_string()))?;
        Ok(())
    }

    async fn execute_js(&self, script: &str) -> DashcamResult<Value> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(DashcamError::script)?;
        let result = self
            .page
            .evaluate_expression(params)
            .await
            .map_err(|e| DashcamError::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn dispatch_mouse(&self, event: MouseEvent) -> DashcamResult<()> {
        let (kind, button, buttons) = match event.kind {
            MouseEventKind::Moved => {
                if self.button_down.load(Ordering::SeqCst) {
                    (DispatchMouseEventType::MouseMoved, MouseButton::Left, 1)
                } else {
                    (DispatchMouseEventType::MouseMoved, MouseButton::None, 0)
                }
            }
            MouseEventKind::Pressed => {
                self.button_down.store(true, Ordering::SeqCst);
                (DispatchMouseEventType::MousePressed, MouseButton::Left, 1)
            }
            MouseEventKind::Released => {
                self.button_down.store(false, Ordering::SeqCst);
                (DispatchMouseEventType::MouseReleased, MouseButton::Left, 0)
            }
        };
        let mut builder = DispatchMouseEventParams::builder()
            .r#type(kind)
            .x(event.point.x)
            .y(event.point.y)
            .button(button)
            .buttons(buttons);
        if event.kind != MouseEventKind::Moved {
            builder = builder.click_count(1);
        }
        let params = builder.build().map_err(input_error)?;
        self.page.execute(params).await.map_err(input_error)?;
        Ok(())
    }

    async fn insert_text(&self, text: &str) -> DashcamResult<()> {
        self.page
            .execute(InsertTextParams::new(text))
            .await
            .map_err(input_error)?;
        Ok(())
    }

    async fn press_key(&self, key: Key) -> DashcamResult<()> {
        let mut down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key(key.key())
            .code(key.code())
            .windows_virtual_key_code(key.virtual_key_code())
            .native_virtual_key_code(key.virtual_key_code());
        if let Some(text) = key.text() {
            down = down.text(text).unmodified_text(text);
        }
        let down = down.build().map_err(input_error)?;
        self.page.execute(down).await.map_err(input_error)?;

        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(key.key())
            .code(key.code())
            .windows_virtual_key_code(key.virtual_key_code())
            .native_virtual_key_code(key.virtual_key_code())
            .build()
            .map_err(input_error)?;
        self.page.execute(up).await.map_err(input_error)?;
        Ok(())
    }

    async fn set_viewport(&mut self, viewport: Viewport) -> DashcamResult<()> {
        let params = SetDeviceMetricsOverrideParams::builder()
            .width(i64::from(viewport.width))
            .height(i64::from(viewport.height))
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(page_error)?;
        self.page.execute(params).await.map_err(page_error)?;
        Ok(())
    }

    async fn screenshot(&self) -> DashcamResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();

        let screenshot =
            self.page
                .execute(params)
                .await
                .map_err(|e| DashcamError::Screenshot {
                    message: e.to_string(),
                })?;

        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| DashcamError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn handle_next_dialog(&self, response: DialogResponse) -> DashcamResult<()> {
        let mut dialogs = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await
            .map_err(page_error)?;
        let page = self.page.clone();
        let task = tokio::spawn(async move {
            let Some(dialog) = dialogs.next().await else {
                return;
            };
            debug!(message = %dialog.message, accept = response.accept, "answering dialog");
            let mut builder = HandleJavaScriptDialogParams::builder().accept(response.accept);
            if let Some(text) = response.prompt_text {
                builder = builder.prompt_text(text);
            }
            match builder.build() {
                Ok(params) => {
                    if let Err(e) = page.execute(params).await {
                        warn!(error = %e, "dialog answer failed");
                    }
                }
                Err(e) => warn!(error = %e, "dialog answer rejected"),
            }
        });
        if let Ok(mut dialogs) = self.dialogs.lock() {
            dialogs.push(task);
        }
        Ok(())
    }

    async fn close(&mut self) -> DashcamResult<Option<PathBuf>> {
        if self.closed {
            return Ok(None);
        }
        self.closed = true;

        let video = match self.recorder.take() {
            Some(recorder) => Some(recorder.finish().await),
            None => None,
        };

        if let Ok(mut dialogs) = self.dialogs.lock() {
            for task in dialogs.drain(..) {
                task.abort();
            }
        }
        shutdown(&mut self.browser, &self.pump).await;

        video.transpose()
    }
}

/// Close the browser process and stop its handler task
async fn shutdown(browser: &mut CdpBrowser, pump: &JoinHandle<()>) {
    if let Err(e) = browser.close().await {
        warn!(error = %e, "browser close failed");
    }
    if let Err(e) = browser.wait().await {
        debug!(error = %e, "browser wait failed");
    }
    pump.abort();
}
