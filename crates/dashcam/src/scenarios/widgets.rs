//! Widget walkthroughs for the recording suite.
//!
//! Each tour spawns one widget, zooms onto its card, exercises it and pulls
//! the camera back out.

use async_trait::async_trait;

use crate::director::Director;
use crate::locator::{Locator, Point};
use crate::result::{DashcamError, DashcamResult};
use crate::scenario::{Scenario, WidgetKind};

/// Widgets with a recorded tour, in suite order
pub const TOURED: [WidgetKind; 13] = [
    WidgetKind::Clock,
    WidgetKind::Timer,
    WidgetKind::Traffic,
    WidgetKind::Dice,
    WidgetKind::Qr,
    WidgetKind::Text,
    WidgetKind::Checklist,
    WidgetKind::Timetable,
    WidgetKind::Embed,
    WidgetKind::Random,
    WidgetKind::Sound,
    WidgetKind::Drawing,
    WidgetKind::Poll,
];

/// Recorded tour of a single widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetTour {
    kind: WidgetKind,
}

impl WidgetTour {
    /// Tour of `kind`
    #[must_use]
    pub const fn new(kind: WidgetKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Scenario for WidgetTour {
    fn name(&self) -> &str {
        self.kind.type_name()
    }

    fn description(&self) -> &str {
        match self.kind {
            WidgetKind::Clock => "Clock widget: spawn, settings, 24h toggle",
            WidgetKind::Timer => "Timer widget: start, pause, reset, settings",
            WidgetKind::Traffic => "Traffic light widget interaction",
            WidgetKind::Dice => "Dice widget: roll and count change",
            WidgetKind::Qr => "QR code widget: URL update",
            WidgetKind::Text => "Note widget: typing and styling",
            WidgetKind::Checklist => "Checklist widget: adding items and checking",
            WidgetKind::Timetable => "Timetable widget: data entry",
            WidgetKind::Embed => "Embed widget: loading a URL",
            WidgetKind::Random => "Name picker: names list and pick",
            WidgetKind::Sound => "Noise meter with a simulated microphone",
            WidgetKind::Drawing => "Sketch widget: freehand strokes",
            WidgetKind::Poll => "Poll widget: voting",
            WidgetKind::Webcam => "Webcam widget",
        }
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        let w = d.spawn(self.kind).await?;
        d.zoom_to_widget(&w).await?;
        match self.kind {
            WidgetKind::Clock => clock(d, &w).await?,
            WidgetKind::Timer => timer(d, &w).await?,
            WidgetKind::Traffic => traffic(d, &w).await?,
            WidgetKind::Dice => dice(d, &w).await?,
            WidgetKind::Qr => qr(d, &w).await?,
            WidgetKind::Text => text(d, &w).await?,
            WidgetKind::Checklist => checklist(d, &w).await?,
            WidgetKind::Timetable => timetable(d, &w).await?,
            WidgetKind::Embed => embed(d, &w).await?,
            WidgetKind::Random => random(d, &w).await?,
            WidgetKind::Sound => sound(d, &w).await?,
            WidgetKind::Drawing => drawing(d, &w).await?,
            WidgetKind::Poll => poll(d, &w).await?,
            WidgetKind::Webcam => {}
        }
        d.reset_camera().await
    }
}

async fn clock(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.click(&w.locator(".inp-24h")).await?;
    d.click(&w.locator(".btn-settings-done")).await
}

async fn timer(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-start")).await?;
    d.wait(2000).await;
    d.click(&w.locator(".btn-pause")).await?;
    d.click(&w.locator(".btn-reset")).await?;

    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-min"), "1").await?;
    d.click(&w.locator(".btn-settings-done")).await
}

async fn traffic(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    for color in ["red", "yellow", "green"] {
        d.click(&w.locator(format!(".traffic-light[data-color='{color}']")))
            .await?;
    }
    Ok(())
}

async fn dice(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-roll")).await?;
    d.wait(1000).await;

    d.click(&w.locator(".btn-settings")).await?;
    let count = w.locator(".inp-count");
    d.click(&count).await?;
    d.select_option(&count, "3").await?;
    d.click(&w.locator(".btn-settings-done")).await?;

    d.click(&w.locator(".btn-roll")).await?;
    d.wait(1000).await;
    Ok(())
}

async fn qr(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-url"), "https://classroom.google.com")
        .await?;
    d.click(&w.locator(".btn-settings-done")).await
}

async fn text(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.type_text(
        &w.locator(".widget-content div[contenteditable]"),
        "Welcome to Class!",
    )
    .await?;

    d.click(&w.locator(".btn-settings")).await?;
    d.click(&w.locator(".bg-picker").nth(1)).await?;
    d.click(&w.locator(".btn-settings-done")).await
}

async fn checklist(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-list"), "Turn in Homework")
        .await?;
    d.click(&w.locator(".btn-update")).await?;
    d.click(&w.locator(".check-item input").first()).await
}

async fn timetable(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-data"), "09:00 | Mathematics")
        .await?;
    d.click(&w.locator(".btn-apply")).await
}

async fn embed(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-embed"), "https://example.com")
        .await?;
    d.click(&w.locator(".btn-load")).await
}

/// Names replacing the picker's list
pub const PICKER_NAMES: [&str; 5] = ["Emily", "Michael", "Jacob", "Joshua", "Matthew"];

async fn random(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.fill(&w.locator(".inp-list"), &PICKER_NAMES.join("\n"))
        .await?;
    d.click(&w.locator(".btn-settings-done")).await?;
    d.click(&w.locator(".btn-pick")).await?;
    d.wait(2000).await;
    Ok(())
}

const FAKE_MICROPHONE: &str =
    "void (navigator.mediaDevices.getUserMedia = () => Promise.resolve(new MediaStream()))";

const METER_START: &str = "(() => { \
     const bar = document.querySelector('.mic-bar'); \
     if (bar) { \
       window.__micBarInterval = setInterval(() => { \
         bar.style.height = (Math.random() * 80 + 10) + '%'; \
       }, 100); \
     } \
   })()";

const METER_STOP: &str = "void (window.__micBarInterval && clearInterval(window.__micBarInterval))";

async fn sound(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.evaluate(FAKE_MICROPHONE).await?;
    d.click(&w.locator(".btn-mic-start")).await?;
    d.evaluate(METER_START).await?;
    d.wait(3000).await;
    d.evaluate(METER_STOP).await?;
    Ok(())
}

async fn stroke(d: &mut Director<'_>, from: Point, to: Point) -> DashcamResult<()> {
    d.mouse_move(from, 1).await?;
    d.mouse_down().await?;
    d.mouse_move(to, 20).await?;
    d.mouse_up().await
}

async fn drawing(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    let canvas = w.locator("canvas");
    let bbox = d
        .bounding_box(&canvas)
        .await?
        .ok_or_else(|| DashcamError::ElementNotFound {
            locator: canvas.to_string(),
        })?;

    stroke(d, bbox.at(100.0, 100.0), bbox.at(200.0, 100.0)).await?;

    d.move_to(w).await?;
    d.click(&w.locator(".btn-color[data-color='#ef4444']"))
        .await?;

    stroke(d, bbox.at(50.0, 50.0), bbox.at(300.0, 300.0)).await
}

async fn poll(d: &mut Director<'_>, w: &Locator) -> DashcamResult<()> {
    d.click(&w.locator(".btn-settings")).await?;
    d.type_text(&w.locator(".inp-opt-a"), "Yes").await?;
    d.type_text(&w.locator(".inp-opt-b"), "No").await?;
    d.click(&w.locator(".btn-settings-done")).await?;

    let votes = w.locator(".btn-vote");
    d.click(&votes.first()).await?;
    d.click(&votes.last()).await?;
    d.click(&w.locator(".btn-reset")).await
}
