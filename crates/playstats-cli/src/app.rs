//! One fetch cycle from identifier to report.

use crate::error::{CliError, CliResult};
use playstats_analytics::{ActivityReport, ActivitySource, CycleStatus, IdentityController};
use playstats_common::{AccountId, StatsError};
use playstats_config::Config;
use std::{num::NonZeroUsize, sync::Arc, time::Duration};
use tracing::{info, instrument, warn};

/// Runs one cycle for `identifier` and formats the settled state.
///
/// Fails with [`CliError::Timeout`] when the cycle is still loading after
/// `config.cycle.timeout_secs`.
#[instrument(skip_all, fields(identifier = %identifier))]
pub async fn fetch_report(
    source: Arc<dyn ActivitySource>,
    identifier: AccountId,
    config: &Config,
) -> CliResult<ActivityReport> {
    let limit = NonZeroUsize::new(config.ranking.top_n).ok_or_else(|| {
        StatsError::validation_field("Top N must be greater than 0", "ranking.top_n")
    })?;

    let mut controller = IdentityController::new(source, limit);
    controller.submit(identifier.clone())?;

    let seconds = config.cycle.timeout_secs;
    let state = tokio::time::timeout(Duration::from_secs(seconds), controller.settle())
        .await
        .map_err(|_| CliError::Timeout {
            identifier: identifier.to_string(),
            seconds,
        })?;

    if let CycleStatus::Failed { failures } = &state.status {
        for failure in failures {
            warn!(kind = %failure.kind, "Retrieval failed: {}", failure.message);
        }
    }

    info!(
        generation = state.snapshot.generation,
        total_minutes = state.snapshot.total_minutes,
        "Cycle settled"
    );
    Ok(ActivityReport::from_state(&state, config.display.mode))
}

#[cfg(test)]
mod tests {
    use super::*;
    use playstats_analytics::StaticActivitySource;
    use playstats_common::{test_utils::record_fixtures, DisplayUnit};

    fn source() -> Arc<dyn ActivitySource> {
        Arc::new(StaticActivitySource::new(
            record_fixtures::recent_entries(),
            record_fixtures::categorized_entries(),
        ))
    }

    #[tokio::test]
    async fn test_fetch_report() {
        let mut config = Config::default();
        config.display.mode = DisplayUnit::Minutes;

        let report = fetch_report(source(), AccountId::new("player"), &config)
            .await
            .unwrap();
        assert_eq!(report.total.to_string(), "900 minutes");
        assert_eq!(report.all_time.entries()[0].label, "X");
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_rejects_empty_identifier() {
        let result = fetch_report(source(), AccountId::new(""), &Config::default()).await;
        assert!(matches!(result, Err(CliError::Stats(_))));
    }
}
