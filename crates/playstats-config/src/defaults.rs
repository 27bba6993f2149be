//! Default values for every configuration section.

use crate::schema::*;
use playstats_common::{DisplayUnit, LoggingConfig};

/// Default base URL of the activity source.
pub const DEFAULT_SOURCE_URL: &str = "http://localhost:5000";

/// Default length of the "most played" lists.
pub const DEFAULT_TOP_N: usize = 5;

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            ranking: RankingConfig::default(),
            display: DisplayConfig::default(),
            cycle: CycleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: 30,
            max_idle_per_host: 10,
            rate_limit_per_sec: 10,
            max_retries: 3,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayUnit::Hours,
            palette: vec![
                "#0088FE".to_string(),
                "#00C49F".to_string(),
                "#FFBB28".to_string(),
                "#FF8042".to_string(),
                "#AF19FF".to_string(),
                "#FF4560".to_string(),
            ],
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}
