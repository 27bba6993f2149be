//! Configuration loading from YAML or TOML files with environment overrides.

use crate::schema::Config;
use playstats_common::{DisplayUnit, StatsError};
use std::{
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "PLAYSTATS_CONFIG_PATH";

/// Files looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["playstats.yaml", "playstats.yml", "playstats.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// File extension that maps to no known format
    #[error("Unsupported configuration format: {0} (expected .yaml, .yml or .toml)")]
    UnsupportedFormat(PathBuf),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParse {
        /// Variable name.
        var: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error(transparent)]
    Invalid(#[from] StatsError),
}

impl From<ConfigError> for StatsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid(inner) => inner,
            other => Self::config_with_source("Failed to load configuration", other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from a file, applies process environment
    /// overrides and validates the result.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let mut config = Self::parse_file(path.as_ref())?;
        Self::apply_env_overrides(&mut config, |var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration using the standard lookup order: explicit path,
    /// `PLAYSTATS_CONFIG_PATH`, `playstats.{yaml,yml,toml}` in the working
    /// directory, built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::load_from_file(path);
        }

        if let Some(found) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.exists())
        {
            return Self::load_from_file(found);
        }

        info!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config, |var| env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration file, choosing the format by extension.
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Parsing configuration file");

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Applies `PLAYSTATS_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PLAYSTATS_SOURCE_URL") {
            config.source.base_url = url;
        }

        if let Some(timeout) = lookup("PLAYSTATS_TIMEOUT") {
            config.source.timeout_secs = parse_var("PLAYSTATS_TIMEOUT", &timeout)?;
        }

        if let Some(retries) = lookup("PLAYSTATS_MAX_RETRIES") {
            config.source.max_retries = parse_var("PLAYSTATS_MAX_RETRIES", &retries)?;
        }

        if let Some(rate) = lookup("PLAYSTATS_RATE_LIMIT") {
            config.source.rate_limit_per_sec = parse_var("PLAYSTATS_RATE_LIMIT", &rate)?;
        }

        if let Some(top_n) = lookup("PLAYSTATS_TOP_N") {
            config.ranking.top_n = parse_var("PLAYSTATS_TOP_N", &top_n)?;
        }

        if let Some(mode) = lookup("PLAYSTATS_DISPLAY_MODE") {
            config.display.mode = parse_var::<DisplayUnit>("PLAYSTATS_DISPLAY_MODE", &mode)?;
        }

        if let Some(level) = lookup("PLAYSTATS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim().parse().map_err(|e| ConfigError::EnvParse {
        var: var.to_string(),
        source: Box::new(e),
    })
}
