//! PlayStats - Main Entry Point

use anyhow::Result;
use clap::Parser;
use playstats_analytics::{ActivitySource, HttpActivitySource};
use playstats_cli::{fetch_report, Args, Presenter};
use playstats_common::{init_logging, AccountId};
use std::{io::Write, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = args.load_config()?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!(source = %config.source.base_url, "Starting PlayStats");

    let source: Arc<dyn ActivitySource> = Arc::new(HttpActivitySource::new(&config.source)?);
    let identifier = AccountId::new(&args.identifier);

    let report = match fetch_report(source, identifier, &config).await {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to build report: {}", e);
            return Err(e.into());
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        Presenter::new(config.display.palette.clone(), !args.no_color)
            .write_report(&report, &mut out)?;
    }

    Ok(())
}
