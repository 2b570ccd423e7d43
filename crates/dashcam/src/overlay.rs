//! Cinematic overlay: synthetic cursor and camera pan/zoom.
//!
//! Headless screen recordings show no pointer, so the overlay draws one that
//! follows `mousemove`. `window.setCamera(x, y, scale)` re-centres content
//! point (x, y) on the viewport by transforming `#app-container`.

use crate::config::Viewport;
use crate::locator::BoundingBox;

/// Camera transition, matched by the director's post-camera wait
pub const CAMERA_TRANSITION: &str = "transform 1.2s cubic-bezier(0.25, 1, 0.5, 1)";

/// Cursor fill while the button is held
pub const CURSOR_PRESSED_FILL: &str = "#4f46e5";

const CURSOR_SVG: &str = "<svg width=\"32\" height=\"32\" viewBox=\"0 0 32 32\" fill=\"none\" xmlns=\"http://www.w3.org/2000/svg\">\
<path d=\"M6 2L26 16L16 18L14 28L6 2Z\" fill=\"FILL\" stroke=\"white\" stroke-width=\"2\" stroke-linejoin=\"round\"/></svg>";

fn cursor_svg(fill: &str) -> String {
    CURSOR_SVG.replace("FILL", fill)
}

/// Script injecting the cursor and `window.setCamera`
#[must_use]
pub fn overlay_script() -> String {
    format!(
        r#"(() => {{
  const idle = {idle};
  const pressed = {pressed};
  const cursor = document.createElement('div');
  cursor.className = 'cinematic-cursor';
  cursor.innerHTML = idle;
  Object.assign(cursor.style, {{
    position: 'fixed', top: '0', left: '0', pointerEvents: 'none', zIndex: '100000',
    transition: 'transform 0.1s cubic-bezier(0.2, 0, 0.2, 1)', transformOrigin: 'top left'
  }});
  document.body.appendChild(cursor);
  let mouseX = 0, mouseY = 0;
  document.addEventListener('mousemove', e => {{
    mouseX = e.clientX;
    mouseY = e.clientY;
    cursor.style.transform = `translate(${{mouseX}}px, ${{mouseY}}px)`;
  }});
  document.addEventListener('mousedown', () => {{
    cursor.innerHTML = pressed;
    cursor.style.transform = `translate(${{mouseX}}px, ${{mouseY}}px) scale(0.8)`;
  }});
  document.addEventListener('mouseup', () => {{
    cursor.innerHTML = idle;
    cursor.style.transform = `translate(${{mouseX}}px, ${{mouseY}}px) scale(1)`;
  }});
  window.setCamera = function (x, y, scale) {{
    const container = document.getElementById('app-container');
    if (!container) {{ return; }}
    container.style.transformOrigin = '0 0';
    container.style.transition = {transition};
    if (scale === 1) {{
      container.style.transform = 'translate(0, 0) scale(1)';
    }} else {{
      const tx = (window.innerWidth / 2) - (x * scale);
      const ty = (window.innerHeight / 2) - (y * scale);
      container.style.transform = `translate(${{tx}}px, ${{ty}}px) scale(${{scale}})`;
    }}
  }};
}})();"#,
        idle = crate::locator::js_string(&cursor_svg("black")),
        pressed = crate::locator::js_string(&cursor_svg(CURSOR_PRESSED_FILL)),
        transition = crate::locator::js_string(CAMERA_TRANSITION),
    )
}

/// A camera target: content point (x, y) shown at `scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraShot {
    /// Content x to centre
    pub x: f64,
    /// Content y to centre
    pub y: f64,
    /// Zoom factor
    pub scale: f64,
}

impl CameraShot {
    /// The identity shot
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }

    /// Frame a box: centre on it, scaled by `policy`
    #[must_use]
    pub fn framing(bbox: &BoundingBox, policy: &ZoomPolicy) -> Self {
        let center = bbox.center();
        Self {
            x: center.x,
            y: center.y,
            scale: policy.scale_for(bbox.height),
        }
    }

    /// `setCamera(...)` call for this shot
    #[must_use]
    pub fn to_js(&self) -> String {
        format!("window.setCamera({}, {}, {})", self.x, self.y, self.scale)
    }

    /// CSS transform `setCamera` applies for this shot in `viewport`
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn css_transform(&self, viewport: Viewport) -> String {
        if self.scale == 1.0 {
            return "translate(0, 0) scale(1)".to_string();
        }
        let tx = f64::from(viewport.width) / 2.0 - self.x * self.scale;
        let ty = f64::from(viewport.height) / 2.0 - self.y * self.scale;
        format!("translate({tx}px, {ty}px) scale({})", self.scale)
    }
}

/// How far to zoom on a widget of a given height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPolicy {
    /// Viewport height the ratio refers to
    pub reference_height: f64,
    /// Fraction of the reference height the widget should fill
    pub target_ratio: f64,
    /// Lower scale bound
    pub min_scale: f64,
    /// Upper scale bound
    pub max_scale: f64,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            reference_height: 720.0,
            target_ratio: 0.6,
            min_scale: 1.2,
            max_scale: 2.5,
        }
    }
}

impl ZoomPolicy {
    /// Scale for a box `height` pixels tall, within `[min_scale, max_scale]`
    ///
    /// Non-finite and non-positive heights get the maximum.
    #[must_use]
    pub fn scale_for(&self, height: f64) -> f64 {
        if !height.is_finite() || height <= 0.0 {
            return self.max_scale;
        }
        let scale = self.reference_height * self.target_ratio / height;
        if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.max_scale
        }
    }
}
