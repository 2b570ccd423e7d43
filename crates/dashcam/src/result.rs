//! Result and error types for Dashcam.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Dashcam operations
pub type DashcamResult<T> = Result<T, DashcamError>;

/// Errors that can occur while driving the dashboard
#[derive(Debug, Error)]
pub enum DashcamError {
    /// The front-end document to load does not exist
    #[error("{} not found. Run from the project root.", path.display())]
    DocumentMissing {
        /// Path that was checked
        path: PathBuf,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page error (creation, teardown, viewport)
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// In-page script evaluation failed
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// No element matched a locator
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Locator description
        locator: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being waited for
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Video recording error
    #[error("Video recording failed: {message}")]
    VideoRecording {
        /// Error message
        message: String,
    },

    /// A scripted check did not hold
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// The backend stub was asked for a method it does not define
    #[error("Backend stub has no method named {method}")]
    UnknownStubMethod {
        /// Method name
        method: String,
    },

    /// Two scenarios registered under one name
    #[error("Scenario {name} is already registered")]
    DuplicateScenario {
        /// Scenario name
        name: String,
    },

    /// Capture configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl DashcamError {
    /// Create a script evaluation error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create an input simulation error
    #[must_use]
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a video recording error
    #[must_use]
    pub fn video(message: impl Into<String>) -> Self {
        Self::VideoRecording {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_missing_message() {
        let err = DashcamError::DocumentMissing {
            path: PathBuf::from("index.html"),
        };
        assert_eq!(
            err.to_string(),
            "index.html not found. Run from the project root."
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = DashcamError::Timeout {
            what: "#widget-2 .btn-settings".to_string(),
            ms: 5000,
        };
        assert!(err.to_string().contains("5000ms"));
        assert!(err.to_string().contains("#widget-2 .btn-settings"));
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(
            DashcamError::script("x"),
            DashcamError::Script { .. }
        ));
        assert!(matches!(DashcamError::input("x"), DashcamError::Input { .. }));
        assert!(matches!(
            DashcamError::assertion("x"),
            DashcamError::AssertionFailed { .. }
        ));
        assert!(matches!(
            DashcamError::video("x"),
            DashcamError::VideoRecording { .. }
        ));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DashcamError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
