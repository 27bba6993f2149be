//! Runtime validation of a loaded configuration.

use crate::schema::Config;
use playstats_common::{Result, StatsError};
use url::Url;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first offending field.
    pub fn validate(config: &Config) -> Result<()> {
        let url = Url::parse(&config.source.base_url).map_err(|e| {
            StatsError::validation_field(
                format!("Source URL '{}' is not valid: {e}", config.source.base_url),
                "source.base_url",
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StatsError::validation_field(
                format!("Source URL must use http or https, got '{}'", url.scheme()),
                "source.base_url",
            ));
        }

        if config.source.timeout_secs == 0 {
            return Err(StatsError::validation_field(
                "Request timeout must be greater than 0",
                "source.timeout_secs",
            ));
        }

        if config.source.rate_limit_per_sec == 0 {
            return Err(StatsError::validation_field(
                "Rate limit must be greater than 0",
                "source.rate_limit_per_sec",
            ));
        }

        if config.ranking.top_n == 0 {
            return Err(StatsError::validation_field(
                "Ranking size must be greater than 0",
                "ranking.top_n",
            ));
        }

        if config.cycle.timeout_secs == 0 {
            return Err(StatsError::validation_field(
                "Cycle timeout must be greater than 0",
                "cycle.timeout_secs",
            ));
        }

        if config.display.palette.is_empty() {
            return Err(StatsError::validation_field(
                "Palette needs at least one color",
                "display.palette",
            ));
        }
        if let Some(bad) = config.display.palette.iter().find(|c| !is_hex_color(c)) {
            return Err(StatsError::validation_field(
                format!("'{bad}' is not a #RRGGBB color"),
                "display.palette",
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}

fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
