//! Scenario trait and name-keyed registry.

use async_trait::async_trait;
use std::fmt;

use crate::capture::CapturePlan;
use crate::director::Director;
use crate::locator::Locator;
use crate::result::{DashcamError, DashcamResult};

/// A named, scripted walk through one feature
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// One-line summary, logged on failure
    fn description(&self) -> &str;

    /// Artifact file stem
    fn artifact_name(&self) -> String {
        self.name().to_string()
    }

    /// Capture plan for this scenario, derived from the suite plan
    fn plan(&self, suite: &CapturePlan) -> CapturePlan {
        suite.clone()
    }

    /// Drive the page
    async fn run(&self, director: &mut Director<'_>) -> DashcamResult<()>;
}

/// Widget types the dashboard can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Clock
    Clock,
    /// Countdown timer
    Timer,
    /// Traffic light
    Traffic,
    /// Sticky note
    Text,
    /// Checklist
    Checklist,
    /// Timetable
    Timetable,
    /// Name picker
    Random,
    /// Dice
    Dice,
    /// QR code
    Qr,
    /// Noise meter
    Sound,
    /// Sketch pad
    Drawing,
    /// Embedded page
    Embed,
    /// Quick poll
    Poll,
    /// Webcam
    Webcam,
}

impl WidgetKind {
    /// Every widget, in comparison order
    pub const ALL: [Self; 14] = [
        Self::Clock,
        Self::Timer,
        Self::Traffic,
        Self::Text,
        Self::Checklist,
        Self::Timetable,
        Self::Random,
        Self::Dice,
        Self::Qr,
        Self::Sound,
        Self::Drawing,
        Self::Embed,
        Self::Poll,
        Self::Webcam,
    ];

    /// Argument to `spawnWidget`
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Timer => "timer",
            Self::Traffic => "traffic",
            Self::Text => "text",
            Self::Checklist => "checklist",
            Self::Timetable => "timetable",
            Self::Random => "random",
            Self::Dice => "dice",
            Self::Qr => "qr",
            Self::Sound => "sound",
            Self::Drawing => "drawing",
            Self::Embed => "embed",
            Self::Poll => "poll",
            Self::Webcam => "webcam",
        }
    }

    /// Title shown on the widget card
    #[must_use]
    pub const fn title(self) -> Option<&'static str> {
        match self {
            Self::Clock => Some("Clock"),
            Self::Timer => Some("Timer"),
            Self::Traffic => Some("Signal"),
            Self::Text => Some("Note"),
            Self::Checklist => Some("Checklist"),
            Self::Timetable => Some("Timetable"),
            Self::Random => Some("Name Picker"),
            Self::Dice => Some("Dice"),
            Self::Qr => Some("QR Code"),
            Self::Sound => Some("Noise Level"),
            Self::Drawing => Some("Sketch"),
            Self::Embed => Some("Embed"),
            Self::Poll => Some("Quick Poll"),
            Self::Webcam => None,
        }
    }

    /// Parse a `spawnWidget` type name
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    /// Locator of the widget's card
    ///
    /// Cards are found by title; an untitled widget resolves to the newest card.
    #[must_use]
    pub fn card(self) -> Locator {
        let cards = Locator::css(".widget");
        match self.title() {
            Some(title) => cards.has_text(title),
            None => cards.last(),
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Scenarios picked for a run
pub struct Selection<'a> {
    /// Known scenarios, in run order
    pub scenarios: Vec<&'a dyn Scenario>,
    /// Requested names with no scenario
    pub unknown: Vec<String>,
}

/// Ordered map from name to scenario
#[derive(Default)]
pub struct ScenarioRegistry {
    entries: Vec<Box<dyn Scenario>>,
}

impl fmt::Debug for ScenarioRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ScenarioRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario; a second scenario under one name is rejected
    pub fn register(&mut self, scenario: Box<dyn Scenario>) -> DashcamResult<()> {
        if self.get(scenario.name()).is_some() {
            return Err(DashcamError::DuplicateScenario {
                name: scenario.name().to_string(),
            });
        }
        self.entries.push(scenario);
        Ok(())
    }

    /// Builder form of [`Self::register`]
    pub fn with(mut self, scenario: impl Scenario + 'static) -> DashcamResult<Self> {
        self.register(Box::new(scenario))?;
        Ok(self)
    }

    /// Look up a scenario
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Scenario> {
        self.entries
            .iter()
            .find(|s| s.name() == name)
            .map(|s| &**s)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.name())
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve requested names; no names selects everything
    #[must_use]
    pub fn select(&self, names: &[String]) -> Selection<'_> {
        if names.is_empty() {
            return Selection {
                scenarios: self.entries.iter().map(|s| &**s).collect(),
                unknown: Vec::new(),
            };
        }
        let mut selection = Selection {
            scenarios: Vec::new(),
            unknown: Vec::new(),
        };
        for name in names {
            match self.get(name) {
                Some(scenario) => selection.scenarios.push(scenario),
                None => selection.unknown.push(name.clone()),
            }
        }
        selection
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Scenario for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test scenario"
        }

        async fn run(&self, _director: &mut Director<'_>) -> DashcamResult<()> {
            Ok(())
        }
    }

    fn registry() -> ScenarioRegistry {
        ScenarioRegistry::new()
            .with(Named("clock"))
            .unwrap()
            .with(Named("timer"))
            .unwrap()
            .with(Named("dice"))
            .unwrap()
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_duplicate_rejected() {
            let err = registry().with(Named("timer")).unwrap_err();
            assert!(matches!(err, DashcamError::DuplicateScenario { name } if name == "timer"));
        }

        #[test]
        fn test_names_in_order() {
            assert_eq!(
                registry().names().collect::<Vec<_>>(),
                vec!["clock", "timer", "dice"]
            );
        }

        #[test]
        fn test_empty_selection_is_everything() {
            let registry = registry();
            let selection = registry.select(&[]);
            assert_eq!(selection.scenarios.len(), 3);
            assert!(selection.unknown.is_empty());
        }

        #[test]
        fn test_selection_keeps_request_order_and_unknowns() {
            let registry = registry();
            let names = vec!["dice".to_string(), "nope".to_string(), "clock".to_string()];
            let selection = registry.select(&names);
            let picked: Vec<&str> = selection.scenarios.iter().map(|s| s.name()).collect();
            assert_eq!(picked, vec!["dice", "clock"]);
            assert_eq!(selection.unknown, vec!["nope"]);
        }

        #[test]
        fn test_default_artifact_name() {
            assert_eq!(Named("clock").artifact_name(), "clock");
        }
    }

    mod widget_kind_tests {
        use super::*;

        #[test]
        fn test_type_names_round_trip() {
            for kind in WidgetKind::ALL {
                assert_eq!(WidgetKind::from_type_name(kind.type_name()), Some(kind));
            }
            assert_eq!(WidgetKind::from_type_name("piano"), None);
        }

        #[test]
        fn test_titles() {
            assert_eq!(WidgetKind::Traffic.title(), Some("Signal"));
            assert_eq!(WidgetKind::Random.title(), Some("Name Picker"));
            assert_eq!(WidgetKind::Webcam.title(), None);
        }

        #[test]
        fn test_card_locators() {
            assert_eq!(
                WidgetKind::Qr.card(),
                Locator::css(".widget").has_text("QR Code")
            );
            assert_eq!(WidgetKind::Webcam.card(), Locator::css(".widget").last());
        }
    }
}
