//! Locator abstraction for element selection and interaction.
//!
//! A locator is a chain of steps (CSS query, text filter, index pick) that is
//! compiled to a JavaScript expression and resolved inside the page on every
//! use, so it always sees the live DOM.
//!
//! ```ignore
//! let widget = Locator::css(".widget").has_text("Clock");
//! let done = widget.locator(".btn-settings-done");
//! let probe = done.probe(page).await?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::driver::PageDriver;
use crate::result::{DashcamError, DashcamResult};

/// Default timeout for waiting on an element (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval while waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Marker embedded in every locator script
pub const PROBE_MARKER: &str = "/*dashcam:probe*/";

/// A point in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this point
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Point `t` of the way from `self` to `to`
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self::new(
            self.x + (to.x - self.x) * t,
            self.y + (to.y - self.y) * t,
        )
    }
}

/// Bounding box for an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Top-left corner offset by (dx, dy)
    #[must_use]
    pub fn at(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    /// Descendants matching a CSS selector
    Css(String),
    /// Keep elements whose text contains the needle (case-insensitive)
    HasText(String),
    /// Keep only the nth match
    Nth(usize),
    /// Keep only the last match
    Last,
}

/// State to wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Present in the DOM
    Attached,
    /// Present and rendered with a non-empty box
    Visible,
    /// Absent or not rendered
    Hidden,
}

impl WaitState {
    fn is_met(self, probe: &ElementProbe) -> bool {
        match self {
            Self::Attached => probe.found,
            Self::Visible => probe.found && probe.visible,
            Self::Hidden => !probe.found || !probe.visible,
        }
    }
}

/// Snapshot of the first element a locator resolves to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementProbe {
    /// Whether any element matched
    pub found: bool,
    /// Whether the first match is rendered
    pub visible: bool,
    /// Number of matches
    pub count: usize,
    /// Box of the first match
    #[serde(rename = "box")]
    pub bounding_box: Option<BoundingBox>,
    /// Rendered text of the first match
    pub text: Option<String>,
    /// Form value of the first match, if it has one
    pub value: Option<String>,
}

/// Action applied to the first element before it is probed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementAction {
    /// Read only
    None,
    /// Focus the element
    Focus,
    /// Focus and empty the element's value or editable text
    Clear,
    /// Scroll the element into view if needed
    ScrollIntoView,
    /// Choose an `<option>` by value or label
    SelectOption(String),
    /// Call a JavaScript function with the element (`el => ...`)
    Evaluate(String),
}

impl ElementAction {
    fn to_js(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Focus => "el.focus();".to_string(),
            Self::Clear => "el.focus(); \
                 if (el.isContentEditable) { el.textContent = ''; } \
                 else if ('value' in el) { el.value = ''; } \
                 el.dispatchEvent(new Event('input', { bubbles: true }));"
                .to_string(),
            Self::ScrollIntoView => "if (el.scrollIntoViewIfNeeded) { el.scrollIntoViewIfNeeded(true); } \
                 else { el.scrollIntoView({ block: 'center', inline: 'center' }); }"
                .to_string(),
            Self::SelectOption(wanted) => format!(
                "const wanted = {}; \
                 const opt = Array.from(el.options || []).find(o => o.value === wanted || o.label === wanted); \
                 if (!opt) {{ throw new Error('no option ' + wanted); }} \
                 el.value = opt.value; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                js_string(wanted)
            ),
            Self::Evaluate(function) => format!("({function})(el);"),
        }
    }
}

/// A lazily-resolved reference to elements in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    /// Locate elements matching a CSS selector anywhere in the document
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::Css(selector.into())],
        }
    }

    /// Locate descendants of the current matches
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        self.with_step(Step::Css(selector.into()))
    }

    /// Keep matches whose text contains `text`
    #[must_use]
    pub fn has_text(&self, text: impl Into<String>) -> Self {
        self.with_step(Step::HasText(text.into()))
    }

    /// Keep the nth match (zero-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_step(Step::Nth(index))
    }

    /// Keep the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Keep the last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.with_step(Step::Last)
    }

    fn with_step(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }

    /// JavaScript expression evaluating to the array of matches
    #[must_use]
    pub fn resolve_js(&self) -> String {
        let mut js = String::from("(() => { let els = [document];");
        for step in &self.steps {
            let line = match step {
                Step::Css(selector) => format!(
                    " els = Array.from(new Set(els.flatMap(root => Array.from(root.querySelectorAll({})))));",
                    js_string(selector)
                ),
                Step::HasText(text) => format!(
                    " els = els.filter(el => (el.textContent || '').toLowerCase().includes({}));",
                    js_string(&text.to_lowercase())
                ),
                Step::Nth(index) => format!(" els = els.slice({index}, {});", index + 1),
                Step::Last => " els = els.slice(-1);".to_string(),
            };
            js.push_str(&line);
        }
        js.push_str(" return els; })()");
        js
    }

    /// Script that applies `action` to the first match and returns its probe
    #[must_use]
    pub fn probe_js(&self, action: &ElementAction) -> String {
        format!(
            "{PROBE_MARKER}(() => {{ \
             const els = {resolve}; \
             const el = els[0]; \
             if (!el) {{ return {{ found: false, visible: false, count: 0, box: null, text: null, value: null }}; }} \
             {action} \
             const r = el.getBoundingClientRect(); \
             const s = window.getComputedStyle(el); \
             const visible = r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
             return {{ found: true, visible, count: els.length, \
                       box: {{ x: r.x, y: r.y, width: r.width, height: r.height }}, \
                       text: el.innerText ?? el.textContent ?? null, \
                       value: ('value' in el) ? String(el.value) : null }}; \
             }})()",
            resolve = self.resolve_js(),
            action = action.to_js(),
        )
    }

    /// Probe the first match without touching it
    pub async fn probe(&self, page: &dyn PageDriver) -> DashcamResult<ElementProbe> {
        self.act(page, &ElementAction::None).await
    }

    /// Apply an action to the first match; fails if nothing matches
    pub async fn act(
        &self,
        page: &dyn PageDriver,
        action: &ElementAction,
    ) -> DashcamResult<ElementProbe> {
        let value = page.execute_js(&self.probe_js(action)).await?;
        let probe: ElementProbe = serde_json::from_value(value)?;
        if !probe.found && *action != ElementAction::None {
            return Err(DashcamError::ElementNotFound {
                locator: self.to_string(),
            });
        }
        Ok(probe)
    }

    /// Bounding box of the first match, if it is rendered
    pub async fn bounding_box(&self, page: &dyn PageDriver) -> DashcamResult<Option<BoundingBox>> {
        let probe = self.probe(page).await?;
        Ok(probe.bounding_box.filter(|_| probe.visible))
    }

    /// Whether the first match is rendered right now
    pub async fn is_visible(&self, page: &dyn PageDriver) -> DashcamResult<bool> {
        Ok(WaitState::Visible.is_met(&self.probe(page).await?))
    }

    /// Rendered text of the first match
    pub async fn inner_text(&self, page: &dyn PageDriver) -> DashcamResult<String> {
        let probe = self.probe(page).await?;
        if !probe.found {
            return Err(DashcamError::ElementNotFound {
                locator: self.to_string(),
            });
        }
        Ok(probe.text.unwrap_or_default())
    }

    /// Poll until the first match reaches `state`
    pub async fn wait_for(
        &self,
        page: &dyn PageDriver,
        state: WaitState,
        timeout: Duration,
    ) -> DashcamResult<ElementProbe> {
        let poll = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let probe = self.probe(page).await?;
            if state.is_met(&probe) {
                return Ok(probe);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DashcamError::Timeout {
                    what: self.to_string(),
                    ms: timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(poll).await;
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            match step {
                Step::Css(selector) => f.write_str(selector)?,
                Step::HasText(text) => write!(f, "has_text={text:?}")?,
                Step::Nth(index) => write!(f, "nth={index}")?,
                Step::Last => f.write_str("last")?,
            }
        }
        Ok(())
    }
}

/// Encode a Rust string as a JavaScript string literal
#[must_use]
pub fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod geometry_tests {
        use super::*;

        #[test]
        fn test_center() {
            let bbox = BoundingBox::new(100.0, 50.0, 280.0, 160.0);
            assert_eq!(bbox.center(), Point::new(240.0, 130.0));
        }

        #[test]
        fn test_offset_from_corner() {
            let bbox = BoundingBox::new(10.0, 20.0, 400.0, 300.0);
            assert_eq!(bbox.at(100.0, 100.0), Point::new(110.0, 120.0));
        }

        #[test]
        fn test_lerp() {
            let a = Point::new(0.0, 0.0);
            let b = Point::new(100.0, 50.0);
            assert_eq!(a.lerp(b, 0.5), Point::new(50.0, 25.0));
            assert_eq!(a.lerp(b, 1.0), b);
        }
    }

    mod script_tests {
        use super::*;

        #[test]
        fn test_css_step() {
            let js = Locator::css(".widget").resolve_js();
            assert!(js.contains("querySelectorAll(\".widget\")"));
            assert!(js.ends_with("return els; })()"));
        }

        #[test]
        fn test_has_text_is_case_insensitive() {
            let js = Locator::css(".widget").has_text("QR Code").resolve_js();
            assert!(js.contains("toLowerCase().includes(\"qr code\")"));
        }

        #[test]
        fn test_scoped_chain_order() {
            let js = Locator::css(".widget")
                .has_text("Clock")
                .locator(".btn-settings")
                .resolve_js();
            let widget = js.find(".widget").unwrap();
            let text = js.find("clock").unwrap();
            let button = js.find(".btn-settings").unwrap();
            assert!(widget < text && text < button);
        }

        #[test]
        fn test_nth_and_last() {
            assert!(Locator::css(".bg-opt")
                .nth(2)
                .resolve_js()
                .contains("els.slice(2, 3)"));
            assert!(Locator::css(".bg-opt")
                .last()
                .resolve_js()
                .contains("els.slice(-1)"));
            assert!(Locator::css(".btn-vote")
                .first()
                .resolve_js()
                .contains("els.slice(0, 1)"));
        }

        #[test]
        fn test_selector_quotes_escaped() {
            let js = Locator::css(".traffic-light[data-color='red']").resolve_js();
            assert!(js.contains("\".traffic-light[data-color='red']\""));
            let js = Locator::css("a").has_text("say \"hi\"").resolve_js();
            assert!(js.contains("say \\\"hi\\\""));
        }

        #[test]
        fn test_probe_script_carries_marker_and_action() {
            let js = Locator::css(".inp-count").probe_js(&ElementAction::SelectOption("3".into()));
            assert!(js.starts_with(PROBE_MARKER));
            assert!(js.contains("const wanted = \"3\""));
            assert!(js.contains("'change'"));
        }

        #[test]
        fn test_evaluate_action_wraps_function() {
            let js = ElementAction::Evaluate("el => el.classList.add('hidden')".into()).to_js();
            assert_eq!(js, "(el => el.classList.add('hidden'))(el);");
        }

        #[test]
        fn test_display() {
            let locator = Locator::css(".widget").has_text("Dice").locator(".btn-roll").nth(1);
            assert_eq!(
                locator.to_string(),
                ".widget >> has_text=\"Dice\" >> .btn-roll >> nth=1"
            );
        }
    }

    mod probe_tests {
        use super::*;

        #[test]
        fn test_probe_deserializes_box_field() {
            let probe: ElementProbe = serde_json::from_value(serde_json::json!({
                "found": true,
                "visible": true,
                "count": 2,
                "box": { "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0 },
                "text": "Clock",
                "value": null
            }))
            .unwrap();
            assert_eq!(probe.count, 2);
            assert_eq!(
                probe.bounding_box,
                Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
            );
        }

        #[test]
        fn test_wait_states() {
            let missing = ElementProbe::default();
            let hidden = ElementProbe {
                found: true,
                ..ElementProbe::default()
            };
            let shown = ElementProbe {
                found: true,
                visible: true,
                ..ElementProbe::default()
            };
            assert!(!WaitState::Attached.is_met(&missing));
            assert!(WaitState::Attached.is_met(&hidden));
            assert!(!WaitState::Visible.is_met(&hidden));
            assert!(WaitState::Visible.is_met(&shown));
            assert!(WaitState::Hidden.is_met(&missing));
            assert!(WaitState::Hidden.is_met(&hidden));
            assert!(!WaitState::Hidden.is_met(&shown));
        }
    }
}
