//! Command line arguments.

use crate::error::CliResult;
use clap::Parser;
use playstats_common::DisplayUnit;
use playstats_config::{Config, ConfigLoader};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "playstats", author, version, about, long_about = None)]
pub struct Args {
    /// Account identifier to report on
    pub identifier: String,

    /// Configuration file path
    #[arg(short, long, env = "PLAYSTATS_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Log level filter, overrides the configured level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Number of entries per ranking
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Display unit: minutes, hours or percentage
    #[arg(short, long)]
    pub mode: Option<DisplayUnit>,

    /// Seconds to wait for both retrievals before giving up
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Base URL of the activity source
    #[arg(long)]
    pub source_url: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored category swatches
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    /// Loads the configuration and applies command line overrides on top.
    pub fn load_config(&self) -> CliResult<Config> {
        let mut config = ConfigLoader::load(self.config.as_deref())?;
        self.apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Applies the flags that were given to `config` and validates it again.
    pub fn apply_overrides(&self, config: &mut Config) -> CliResult<()> {
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(top) = self.top {
            config.ranking.top_n = top;
        }
        if let Some(mode) = self.mode {
            config.display.mode = mode;
        }
        if let Some(timeout) = self.timeout_secs {
            config.cycle.timeout_secs = timeout;
        }
        if let Some(url) = &self.source_url {
            config.source.base_url.clone_from(url);
        }

        config.validate()?;
        Ok(())
    }
}
