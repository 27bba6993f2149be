//! Error types and utilities for PlayStats

use thiserror::Error;

/// Result type alias for PlayStats operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Main error type for PlayStats operations
#[derive(Error, Debug)]
pub enum StatsError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (connect failures, timeouts, unreadable bodies)
    #[error("Network error: {message}")]
    Network {
        /// Human-readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The activity source answered with a non-success status
    #[error("Activity source error: {message}")]
    Source {
        /// Human-readable description.
        message: String,
        /// HTTP status code returned by the source.
        status_code: Option<u16>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description.
        message: String,
        /// Offending field, if known.
        field: Option<String>,
    },

    /// A display mode name that no formatter understands
    #[error("Invalid display mode: {mode:?} (expected one of: minutes, hours, percentage)")]
    InvalidMode {
        /// The unrecognized mode name.
        mode: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        /// Human-readable description.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StatsError {
    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new activity source error with status code
    pub fn source_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Source {
            message: msg.into(),
            status_code: Some(status),
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new invalid display mode error
    pub fn invalid_mode(mode: impl Into<String>) -> Self {
        Self::InvalidMode { mode: mode.into() }
    }

    /// HTTP status code attached to this error, if any
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Source { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Network failures and 5xx answers are transient; 4xx answers and
    /// local errors are not.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Source {
                status_code: Some(code),
                ..
            } => *code >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = StatsError::with_source("test message", io::Error::other("inner"));
        assert!(error.to_string().contains("test message"));

        let config_error = StatsError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let source_error = StatsError::source_with_status("Server error", 500);
        assert!(source_error.to_string().contains("Activity source error"));
        assert_eq!(source_error.status_code(), Some(500));

        let validation_error = StatsError::validation_field("Invalid input", "top_n");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(validation_error.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_invalid_mode_message() {
        let error = StatsError::invalid_mode("weeks");
        assert_eq!(
            error.to_string(),
            "Invalid display mode: \"weeks\" (expected one of: minutes, hours, percentage)"
        );
    }

    #[test]
    fn test_transient_classification() {
        let reset = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        assert!(StatsError::network_with_source("connection reset", reset).is_transient());
        assert!(StatsError::source_with_status("bad gateway", 502).is_transient());
        assert!(!StatsError::source_with_status("not found", 404).is_transient());
        assert!(!StatsError::config("nope").is_transient());
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = StatsError::with_source("Failed to read file", io_error);

        assert!(wrapped_error.to_string().contains("Failed to read file"));
        assert!(wrapped_error.source().is_some());

        let config_source_error = StatsError::config_with_source(
            "Config loading failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );
        assert!(config_source_error.to_string().contains("Configuration error"));
        assert!(config_source_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let stats_error: StatsError = io_error.into();

        assert!(stats_error.to_string().contains("I/O error"));
        assert!(stats_error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_error = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#)
            .unwrap_err();
        let stats_error: StatsError = serde_error.into();

        assert!(stats_error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_display_formatting() {
        assert_eq!(
            StatsError::invalid_mode("days").to_string(),
            "Invalid display mode: \"days\" (expected one of: minutes, hours, percentage)"
        );
        assert_eq!(
            StatsError::config("missing field").to_string(),
            "Configuration error: missing field"
        );
    }
}
