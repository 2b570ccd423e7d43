//! Capture configuration.
//!
//! Every path and knob the suites use, with defaults that match the
//! dashboard repository layout. A YAML file can override any subset of
//! fields; `CHROMIUM_PATH` overrides the browser executable.

use crate::result::{DashcamError, DashcamResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the Chromium executable
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Browser viewport size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl Viewport {
    /// 1280x720, the recording size
    pub const HD: Self = Self::new(1280, 720);
    /// 1920x1080, the comparison screenshot size
    pub const FULL_HD: Self = Self::new(1920, 1080);

    /// Create a viewport
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::HD
    }
}

/// Video recording settings for a browser context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Directory raw recordings are written to
    pub dir: PathBuf,
    /// Output frame size
    pub size: Viewport,
    /// Frames per second (1-60)
    pub fps: u8,
}

impl VideoSettings {
    /// Create settings for a directory and frame size at 25 fps
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, size: Viewport) -> Self {
        Self {
            dir: dir.into(),
            size,
            fps: 25,
        }
    }

    /// Set frames per second (clamped to 1-60)
    #[must_use]
    pub fn with_fps(mut self, fps: u8) -> Self {
        self.fps = fps.clamp(1, 60);
        self
    }
}

/// Configuration shared by all capture suites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Front-end document, relative to the working directory
    pub html_path: PathBuf,
    /// Output directory for scenario videos
    pub video_dir: PathBuf,
    /// Output directory for verification screenshots
    pub verification_dir: PathBuf,
    /// Output directory for widget comparison screenshots
    pub comparison_dir: PathBuf,
    /// Run the browser without a window
    pub headless: bool,
    /// Chromium sandbox (disable in containers)
    pub sandbox: bool,
    /// Chromium executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
    /// Recording frame rate
    pub fps: u8,
    /// Session code replied by the demo backend stub
    pub session_code: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            html_path: PathBuf::from("index.html"),
            video_dir: PathBuf::from("videos"),
            verification_dir: PathBuf::from("verification"),
            comparison_dir: PathBuf::from("onboarding-video/public"),
            headless: true,
            sandbox: true,
            chrome_path: None,
            fps: 25,
            session_code: "DEMO12".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML configuration file; absent fields keep their defaults
    pub fn from_yaml_file(path: &Path) -> DashcamResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DashcamError::Config {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse a YAML configuration
    pub fn from_yaml_str(text: &str) -> DashcamResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides (`CHROMIUM_PATH`)
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(path) = std::env::var_os(CHROMIUM_PATH_ENV) {
            if !path.is_empty() {
                self.chrome_path = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Set the front-end document path
    #[must_use]
    pub fn with_html_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.html_path = path.into();
        self
    }

    /// Root every output directory under `root`
    #[must_use]
    pub fn with_output_root(mut self, root: &Path) -> Self {
        self.video_dir = root.join(&self.video_dir);
        self.verification_dir = root.join(&self.verification_dir);
        self.comparison_dir = root.join(&self.comparison_dir);
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable the Chromium sandbox
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Check field ranges
    pub fn validate(&self) -> DashcamResult<()> {
        if self.fps == 0 || self.fps > 60 {
            return Err(DashcamError::Config {
                message: format!("fps must be within 1-60, got {}", self.fps),
            });
        }
        if self.session_code.trim().is_empty() {
            return Err(DashcamError::Config {
                message: "session_code must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Verify the front-end document exists and return its absolute path
    pub fn ensure_document(&self) -> DashcamResult<PathBuf> {
        if !self.html_path.is_file() {
            return Err(DashcamError::DocumentMissing {
                path: self.html_path.clone(),
            });
        }
        Ok(std::fs::canonicalize(&self.html_path)?)
    }

    /// `file://` URL of the front-end document
    pub fn document_url(&self) -> DashcamResult<String> {
        let path = self.ensure_document()?;
        Ok(file_url(&path))
    }
}

/// Build a `file://` URL for an absolute path
#[must_use]
pub fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{text}")
    } else {
        format!("file:///{text}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_default_paths() {
            let config = CaptureConfig::default();
            assert_eq!(config.html_path, PathBuf::from("index.html"));
            assert_eq!(config.video_dir, PathBuf::from("videos"));
            assert_eq!(config.verification_dir, PathBuf::from("verification"));
            assert_eq!(
                config.comparison_dir,
                PathBuf::from("onboarding-video/public")
            );
            assert_eq!(config.session_code, "DEMO12");
            assert!(config.headless);
        }

        #[test]
        fn test_viewport_presets() {
            assert_eq!(Viewport::HD, Viewport::new(1280, 720));
            assert_eq!(Viewport::FULL_HD, Viewport::new(1920, 1080));
            assert_eq!(Viewport::default(), Viewport::HD);
        }

        #[test]
        fn test_video_fps_clamped() {
            let video = VideoSettings::new("videos", Viewport::HD).with_fps(120);
            assert_eq!(video.fps, 60);
            let video = VideoSettings::new("videos", Viewport::HD).with_fps(0);
            assert_eq!(video.fps, 1);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = CaptureConfig::from_yaml_str("fps: 30\nheadless: false\n").unwrap();
            assert_eq!(config.fps, 30);
            assert!(!config.headless);
            assert_eq!(config.video_dir, PathBuf::from("videos"));
        }

        #[test]
        fn test_invalid_fps_rejected() {
            let err = CaptureConfig::from_yaml_str("fps: 0\n").unwrap_err();
            assert!(matches!(err, DashcamError::Config { .. }));
        }

        #[test]
        fn test_empty_session_code_rejected() {
            let err = CaptureConfig::from_yaml_str("session_code: ' '\n").unwrap_err();
            assert!(matches!(err, DashcamError::Config { .. }));
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = CaptureConfig::from_yaml_file(Path::new("/nonexistent/dashcam.yaml"))
                .unwrap_err();
            assert!(matches!(err, DashcamError::Config { .. }));
        }
    }

    mod document_tests {
        use super::*;

        #[test]
        fn test_missing_document() {
            let config = CaptureConfig::new().with_html_path("/nonexistent/index.html");
            let err = config.ensure_document().unwrap_err();
            assert!(matches!(err, DashcamError::DocumentMissing { .. }));
        }

        #[test]
        fn test_document_url() {
            let dir = tempfile::tempdir().unwrap();
            let html = dir.path().join("index.html");
            std::fs::write(&html, "<html></html>").unwrap();
            let config = CaptureConfig::new().with_html_path(&html);
            let url = config.document_url().unwrap();
            assert!(url.starts_with("file://"));
            assert!(url.ends_with("/index.html"));
        }

        #[test]
        fn test_file_url_unix() {
            assert_eq!(
                file_url(Path::new("/srv/app/index.html")),
                "file:///srv/app/index.html"
            );
        }

        #[test]
        fn test_output_root() {
            let config = CaptureConfig::new().with_output_root(Path::new("/tmp/out"));
            assert_eq!(config.video_dir, PathBuf::from("/tmp/out/videos"));
            assert_eq!(
                config.comparison_dir,
                PathBuf::from("/tmp/out/onboarding-video/public")
            );
        }
    }
}
