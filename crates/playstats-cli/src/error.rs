//! Application-wide error types using thiserror.

use playstats_common::StatsError;
use playstats_config::ConfigError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error raised by the analytics core or the activity source.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// The fetch cycle did not settle in time.
    #[error("Timed out after {seconds}s waiting for activity of {identifier}")]
    Timeout {
        /// Identifier the cycle was started for.
        identifier: String,
        /// Configured wait.
        seconds: u64,
    },

    /// Writing the report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the terminal application.
pub type CliResult<T> = Result<T, CliError>;
