//! Application-level tours: backgrounds, saving, live sessions.

use async_trait::async_trait;

use crate::director::Director;
use crate::driver::Key;
use crate::locator::Locator;
use crate::result::DashcamResult;
use crate::scenario::{Scenario, WidgetKind};

/// Name answered to the save prompt
pub const SAVED_DASHBOARD_NAME: &str = "Demo Dashboard";

/// Join code typed by the student
pub const STUDENT_JOIN_CODE: &str = "DEMO12";

const REVEAL_SESSION_MENU: &str =
    "void document.getElementById('session-menu').classList.remove('hidden')";

/// Tours of features outside any single widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTour {
    /// Background picker
    Backgrounds,
    /// Saving, listing and renaming dashboards
    SaveLoad,
    /// Starting, pausing and ending a live session
    TeacherSession,
    /// Joining a session as a student
    StudentJoin,
}

impl SystemTour {
    /// Tours in suite order
    pub const ALL: [Self; 4] = [
        Self::Backgrounds,
        Self::SaveLoad,
        Self::TeacherSession,
        Self::StudentJoin,
    ];
}

#[async_trait]
impl Scenario for SystemTour {
    fn name(&self) -> &str {
        match self {
            Self::Backgrounds => "backgrounds",
            Self::SaveLoad => "save_load",
            Self::TeacherSession => "teacher_session",
            Self::StudentJoin => "student_join",
        }
    }

    fn description(&self) -> &str {
        match self {
            Self::Backgrounds => "Background picker: cycling wallpapers",
            Self::SaveLoad => "Saving a dashboard and renaming it",
            Self::TeacherSession => "Teacher live session: start, share, pause, resume, end",
            Self::StudentJoin => "Student join screen: code entry and leave",
        }
    }

    async fn run(&self, d: &mut Director<'_>) -> DashcamResult<()> {
        match self {
            Self::Backgrounds => backgrounds(d).await,
            Self::SaveLoad => save_load(d).await,
            Self::TeacherSession => teacher_session(d).await,
            Self::StudentJoin => student_join(d).await,
        }
    }
}

async fn backgrounds(d: &mut Director<'_>) -> DashcamResult<()> {
    let menu = Locator::css("#btn-bg-menu");
    let options = Locator::css(".bg-opt");
    // Picking a background closes the menu
    for option in [options.nth(1), options.nth(2), options.last()] {
        d.click(&menu).await?;
        d.click(&option).await?;
    }
    Ok(())
}

async fn save_load(d: &mut Director<'_>) -> DashcamResult<()> {
    d.spawn(WidgetKind::Clock).await?;

    d.accept_next_dialog(SAVED_DASHBOARD_NAME).await?;
    d.click(&Locator::css("#btn-save")).await?;
    d.wait(1000).await;

    d.click(&Locator::css("#btn-my-dashboards")).await?;
    d.click(&Locator::css(".btn-edit").first()).await?;

    let rename = Locator::css(".dashboard-rename-input").first();
    d.fill(&rename, "Renamed").await?;
    d.press(&rename, Key::Enter).await?;

    d.click(&Locator::css("#btn-my-dashboards")).await
}

async fn teacher_session(d: &mut Director<'_>) -> DashcamResult<()> {
    d.click(&Locator::css("#btn-start-session")).await?;
    d.click(&Locator::css("#btn-menu-start-session")).await?;
    d.wait(1000).await;

    d.click(&Locator::css("#btn-copy-link")).await?;
    d.wait(1000).await;

    // The menu closes on every action
    d.evaluate(REVEAL_SESSION_MENU).await?;
    d.click(&Locator::css("#btn-menu-pause")).await?;
    d.wait(1000).await;

    d.evaluate(REVEAL_SESSION_MENU).await?;
    d.click(&Locator::css("#btn-menu-resume")).await?;
    d.click(&Locator::css("#btn-end-session")).await
}

async fn student_join(d: &mut Director<'_>) -> DashcamResult<()> {
    d.eval_on(
        &Locator::css("#student-join-screen"),
        "el => el.classList.remove('hidden')",
    )
    .await?;
    d.eval_on(
        &Locator::css("#toolbar-container"),
        "el => el.classList.add('hidden')",
    )
    .await?;

    d.type_text(&Locator::css("#join-code-input"), STUDENT_JOIN_CODE)
        .await?;
    d.click(&Locator::css("#btn-join-session")).await?;
    d.wait(2000).await;
    d.click(&Locator::css("#btn-leave-session")).await
}
