//! Configuration schema definitions using serde.

use playstats_common::{DisplayUnit, LoggingConfig};
use serde::{Deserialize, Serialize};

/// Main configuration structure for PlayStats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Activity source configuration.
    pub source: SourceConfig,
    /// Ranking configuration.
    pub ranking: RankingConfig,
    /// Display configuration.
    pub display: DisplayConfig,
    /// Fetch cycle configuration.
    pub cycle: CycleConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Activity source (HTTP transport) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL serving `recently_played` and `all_activity_with_categories`.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection pool max idle connections per host.
    pub max_idle_per_host: usize,
    /// Rate limit: requests per second.
    pub rate_limit_per_sec: u32,
    /// Maximum number of retry attempts for transient failures.
    pub max_retries: usize,
}

/// Ranking configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// How many entries the "most played" lists keep.
    pub top_n: usize,
}

/// Display configuration, consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Unit used for playtime magnitudes.
    pub mode: DisplayUnit,
    /// Category colors, assigned in distribution order and reused cyclically.
    pub palette: Vec<String>,
}

/// Fetch cycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// How long the presenter waits for a cycle to settle before giving up.
    pub timeout_secs: u64,
}
