//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Verification checks failed
    #[error("{failed} of {total} checks failed")]
    ChecksFailed {
        /// Failed checks
        failed: usize,
        /// Checks run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dashcam library error
    #[error("{0}")]
    Dashcam(#[from] dashcam::DashcamError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_checks_failed() {
        let err = CliError::ChecksFailed { failed: 1, total: 4 };
        assert_eq!(err.to_string(), "1 of 4 checks failed");
    }

    #[test]
    fn test_missing_document_message_passes_through() {
        let err: CliError = dashcam::DashcamError::DocumentMissing {
            path: PathBuf::from("index.html"),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "index.html not found. Run from the project root."
        );
    }

    #[test]
    fn test_io_error() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.to_string().contains("I/O"));
    }
}
