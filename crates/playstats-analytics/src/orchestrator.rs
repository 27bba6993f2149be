//! Fetch cycles keyed by a generation token.
//!
//! Every cycle issues the two retrievals as independent tokio tasks. The
//! tasks never touch orchestrator state: they report a [`RetrievalOutcome`]
//! over a channel, and the task owning the orchestrator applies outcomes one
//! at a time. An outcome whose generation is no longer current is dropped,
//! so a slow response for an old identifier can never overwrite newer state.
//!
//! ```text
//! Idle ──start_cycle──▶ Loading ──both settled──▶ Ready | Failed
//!                          ▲                          │
//!                          └────────start_cycle───────┘
//! ```

use crate::{
    snapshot::{CycleStatus, RetrievalFailure, Snapshot, StatsState},
    source::ActivitySource,
};
use playstats_common::{
    AccountId, CategorizedEntry, RecentEntry, Result, RetrievalKind, StatsError,
};
use std::{num::NonZeroUsize, sync::Arc};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, info_span, instrument, warn, Instrument};

/// Result of one retrieval, as delivered by its task.
#[derive(Debug)]
pub enum RetrievalPayload {
    /// Answer of `recently_played`.
    Recent(Result<Vec<RecentEntry>>),
    /// Answer of `all_activity_with_categories`.
    Full(Result<Vec<CategorizedEntry>>),
}

impl RetrievalPayload {
    /// Which retrieval produced this payload.
    pub const fn kind(&self) -> RetrievalKind {
        match self {
            Self::Recent(_) => RetrievalKind::Recent,
            Self::Full(_) => RetrievalKind::Full,
        }
    }
}

/// A settled retrieval tagged with the generation that issued it.
#[derive(Debug)]
pub struct RetrievalOutcome {
    /// Generation of the cycle that issued the retrieval.
    pub generation: u64,
    /// The retrieval's result.
    pub payload: RetrievalPayload,
}

/// What applying one outcome did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The outcome belonged to a superseded generation and was dropped.
    Stale,
    /// Recorded; the other retrieval of the cycle is still outstanding.
    Pending,
    /// Both retrievals settled and a new snapshot was committed.
    Committed,
}

#[derive(Debug)]
enum Slot<T> {
    Pending,
    Settled(Vec<T>),
    Failed(RetrievalFailure),
}

impl<T> Slot<T> {
    const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    fn entries(&self) -> &[T] {
        match self {
            Self::Settled(entries) => entries,
            Self::Pending | Self::Failed(_) => &[],
        }
    }

    const fn failure(&self) -> Option<&RetrievalFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Pending | Self::Settled(_) => None,
        }
    }

    fn settle(&mut self, kind: RetrievalKind, result: Result<Vec<T>>) {
        *self = match result {
            Ok(entries) => Self::Settled(entries),
            Err(err) => {
                warn!(%kind, error = %err, "Retrieval failed");
                Self::Failed(RetrievalFailure {
                    kind,
                    message: err.to_string(),
                    status_code: err.status_code(),
                })
            }
        };
    }
}

#[derive(Debug)]
struct Cycle {
    identifier: AccountId,
    recent: Slot<RecentEntry>,
    full: Slot<CategorizedEntry>,
}

impl Cycle {
    fn new(identifier: AccountId) -> Self {
        Self {
            identifier,
            recent: Slot::Pending,
            full: Slot::Pending,
        }
    }

    const fn is_settled(&self) -> bool {
        !self.recent.is_pending() && !self.full.is_pending()
    }
}

/// Runs fetch cycles and owns the committed state.
pub struct FetchOrchestrator {
    source: Arc<dyn ActivitySource>,
    limit: NonZeroUsize,
    generation: u64,
    cycle: Option<Cycle>,
    outcome_tx: mpsc::UnboundedSender<RetrievalOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<RetrievalOutcome>,
    state_tx: watch::Sender<StatsState>,
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("limit", &self.limit)
            .field("generation", &self.generation)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl FetchOrchestrator {
    /// Creates an idle orchestrator whose rankings keep `limit` entries.
    pub fn new(source: Arc<dyn ActivitySource>, limit: NonZeroUsize) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(StatsState::idle(0));

        Self {
            source,
            limit,
            generation: 0,
            cycle: None,
            outcome_tx,
            outcome_rx,
            state_tx,
        }
    }

    /// Generation whose results are currently accepted.
    pub const fn current_generation(&self) -> u64 {
        self.generation
    }

    /// True from [`start_cycle`](Self::start_cycle) until both retrievals of
    /// the current generation have settled.
    pub const fn is_loading(&self) -> bool {
        self.cycle.is_some()
    }

    /// Copy of the published state.
    pub fn state(&self) -> StatsState {
        self.state_tx.borrow().clone()
    }

    /// Receiver observing every published state.
    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.state_tx.subscribe()
    }

    /// Starts a cycle for `identifier`, superseding any cycle in flight.
    ///
    /// Must be called inside a tokio runtime. `generation` has to be larger
    /// than every generation seen before.
    #[instrument(skip(self, identifier), fields(identifier = %identifier))]
    pub fn start_cycle(&mut self, identifier: AccountId, generation: u64) -> Result<()> {
        if generation <= self.generation {
            return Err(StatsError::validation_field(
                format!(
                    "Generation {generation} is not newer than current generation {}",
                    self.generation
                ),
                "generation",
            ));
        }

        if let Some(superseded) = self.cycle.take() {
            debug!(
                superseded_generation = self.generation,
                superseded_identifier = %superseded.identifier,
                "Superseding cycle in flight"
            );
        }

        self.generation = generation;
        self.cycle = Some(Cycle::new(identifier.clone()));
        self.spawn_retrievals(&identifier, generation);

        let snapshot = Arc::clone(&self.state_tx.borrow().snapshot);
        self.publish(CycleStatus::Loading, snapshot);
        info!("Cycle started");
        Ok(())
    }

    fn spawn_retrievals(&self, identifier: &AccountId, generation: u64) {
        {
            let source = Arc::clone(&self.source);
            let tx = self.outcome_tx.clone();
            let identifier = identifier.clone();
            let span = info_span!("retrieval", kind = %RetrievalKind::Recent, generation);
            tokio::spawn(
                async move {
                    let result = source.recently_played(&identifier).await;
                    // A closed channel means the orchestrator is gone.
                    let _ = tx.send(RetrievalOutcome {
                        generation,
                        payload: RetrievalPayload::Recent(result),
                    });
                }
                .instrument(span),
            );
        }

        {
            let source = Arc::clone(&self.source);
            let tx = self.outcome_tx.clone();
            let identifier = identifier.clone();
            let span = info_span!("retrieval", kind = %RetrievalKind::Full, generation);
            tokio::spawn(
                async move {
                    let result = source.all_activity_with_categories(&identifier).await;
                    let _ = tx.send(RetrievalOutcome {
                        generation,
                        payload: RetrievalPayload::Full(result),
                    });
                }
                .instrument(span),
            );
        }
    }

    /// Applies one settled retrieval.
    ///
    /// Outcomes from any generation other than the current one are dropped.
    /// When the second retrieval of the current cycle settles, the snapshot
    /// is built and published together with `Ready` or `Failed`.
    pub fn apply(&mut self, outcome: RetrievalOutcome) -> Applied {
        let kind = outcome.payload.kind();
        if outcome.generation != self.generation {
            debug!(
                %kind,
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "Discarding stale retrieval"
            );
            return Applied::Stale;
        }

        let Some(cycle) = self.cycle.as_mut() else {
            debug!(%kind, generation = outcome.generation, "No cycle in flight, discarding");
            return Applied::Stale;
        };

        match outcome.payload {
            RetrievalPayload::Recent(result) if cycle.recent.is_pending() => {
                cycle.recent.settle(kind, result);
            }
            RetrievalPayload::Full(result) if cycle.full.is_pending() => {
                cycle.full.settle(kind, result);
            }
            _ => {
                warn!(%kind, "Retrieval already settled for this cycle, discarding");
                return Applied::Stale;
            }
        }

        if !cycle.is_settled() {
            return Applied::Pending;
        }

        match self.cycle.take() {
            Some(settled) => {
                self.commit(settled);
                Applied::Committed
            }
            None => Applied::Pending,
        }
    }

    fn commit(&self, cycle: Cycle) {
        let snapshot = Snapshot::build(
            cycle.identifier,
            self.generation,
            cycle.recent.entries(),
            cycle.full.entries(),
            self.limit,
        );

        let failures: Vec<RetrievalFailure> = [cycle.recent.failure(), cycle.full.failure()]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let status = if failures.is_empty() {
            info!(
                generation = self.generation,
                total_minutes = snapshot.total_minutes,
                categories = snapshot.categories.len(),
                "Cycle ready"
            );
            CycleStatus::Ready
        } else {
            warn!(
                generation = self.generation,
                failed = failures.len(),
                has_data = !snapshot.has_no_data(),
                "Cycle failed, committing partial snapshot"
            );
            CycleStatus::Failed { failures }
        };

        self.publish(status, Arc::new(snapshot));
    }

    /// Waits for the next settled retrieval and applies it.
    ///
    /// Returns `None` only if the outcome channel closed.
    pub async fn process_next(&mut self) -> Option<Applied> {
        let outcome = self.outcome_rx.recv().await?;
        Some(self.apply(outcome))
    }

    /// Processes outcomes until the current cycle has settled, then returns
    /// the published state. Returns immediately when nothing is loading.
    ///
    /// A retrieval that never completes keeps this pending; wrap it in
    /// `tokio::time::timeout` to bound the wait.
    pub async fn settle(&mut self) -> StatsState {
        while self.is_loading() {
            if self.process_next().await.is_none() {
                break;
            }
        }
        self.state()
    }

    /// Drops any cycle in flight and publishes an idle, empty snapshot for
    /// `generation`. Later outcomes of older generations become inert.
    pub fn reset(&mut self, generation: u64) {
        self.generation = self.generation.max(generation);
        self.cycle = None;
        self.state_tx.send_replace(StatsState::idle(self.generation));
        info!(generation = self.generation, "Orchestrator reset");
    }

    fn publish(&self, status: CycleStatus, snapshot: Arc<Snapshot>) {
        self.state_tx.send_replace(StatsState { status, snapshot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use playstats_common::test_utils::record_fixtures;

    /// A source whose retrievals never complete, so tests drive the state
    /// machine with hand-made outcomes.
    struct NeverSource;

    #[async_trait]
    impl ActivitySource for NeverSource {
        async fn recently_played(&self, _identifier: &AccountId) -> Result<Vec<RecentEntry>> {
            std::future::pending().await
        }

        async fn all_activity_with_categories(
            &self,
            _identifier: &AccountId,
        ) -> Result<Vec<CategorizedEntry>> {
            std::future::pending().await
        }
    }

    fn orchestrator() -> FetchOrchestrator {
        FetchOrchestrator::new(Arc::new(NeverSource), NonZeroUsize::new(5).unwrap())
    }

    fn recent_ok(generation: u64) -> RetrievalOutcome {
        RetrievalOutcome {
            generation,
            payload: RetrievalPayload::Recent(Ok(record_fixtures::recent_entries())),
        }
    }

    fn full_ok(generation: u64) -> RetrievalOutcome {
        RetrievalOutcome {
            generation,
            payload: RetrievalPayload::Full(Ok(record_fixtures::categorized_entries())),
        }
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let orchestrator = orchestrator();
        let state = orchestrator.state();
        assert_eq!(state.status, CycleStatus::Idle);
        assert!(state.snapshot.has_no_data());
        assert!(!orchestrator.is_loading());
    }

    #[tokio::test]
    async fn test_loading_until_both_settle() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();
        assert!(orchestrator.is_loading());
        assert_eq!(orchestrator.state().status, CycleStatus::Loading);

        assert_eq!(orchestrator.apply(full_ok(1)), Applied::Pending);
        assert!(orchestrator.is_loading());

        assert_eq!(orchestrator.apply(recent_ok(1)), Applied::Committed);
        assert!(!orchestrator.is_loading());

        let state = orchestrator.state();
        assert_eq!(state.status, CycleStatus::Ready);
        assert_eq!(state.snapshot.generation, 1);
        assert_eq!(state.snapshot.total_minutes, 900);
    }

    #[tokio::test]
    async fn test_stale_outcome_is_dropped() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();
        orchestrator.start_cycle(AccountId::new("b"), 2).unwrap();

        assert_eq!(orchestrator.apply(recent_ok(1)), Applied::Stale);
        assert_eq!(orchestrator.apply(full_ok(1)), Applied::Stale);
        assert!(orchestrator.is_loading());
        assert_eq!(orchestrator.state().status, CycleStatus::Loading);
    }

    #[tokio::test]
    async fn test_generation_must_increase() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 3).unwrap();
        assert!(orchestrator.start_cycle(AccountId::new("a"), 3).is_err());
        assert!(orchestrator.start_cycle(AccountId::new("a"), 2).is_err());
        assert_eq!(orchestrator.current_generation(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_outcome_is_ignored() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();
        assert_eq!(orchestrator.apply(recent_ok(1)), Applied::Pending);
        assert_eq!(orchestrator.apply(recent_ok(1)), Applied::Stale);
        assert!(orchestrator.is_loading());
    }

    #[tokio::test]
    async fn test_failure_commits_partial_snapshot() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();

        orchestrator.apply(RetrievalOutcome {
            generation: 1,
            payload: RetrievalPayload::Recent(Err(StatsError::source_with_status("down", 503))),
        });
        assert_eq!(orchestrator.apply(full_ok(1)), Applied::Committed);

        let state = orchestrator.state();
        match &state.status {
            CycleStatus::Failed { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].kind, RetrievalKind::Recent);
                assert_eq!(failures[0].status_code, Some(503));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(state.snapshot.recent.is_empty());
        assert_eq!(state.snapshot.all_time.len(), 2);
    }

    #[tokio::test]
    async fn test_reset_publishes_empty_snapshot() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();
        orchestrator.apply(recent_ok(1));
        orchestrator.apply(full_ok(1));

        orchestrator.reset(2);

        let state = orchestrator.state();
        assert_eq!(state.status, CycleStatus::Idle);
        assert!(state.snapshot.has_no_data());
        assert_eq!(state.snapshot.generation, 2);
        assert_eq!(orchestrator.apply(full_ok(1)), Applied::Stale);
    }

    #[tokio::test]
    async fn test_settle_pending_while_retrievals_outstanding() {
        let mut orchestrator = orchestrator();
        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();

        let mut settle = tokio_test::task::spawn(orchestrator.settle());
        tokio_test::assert_pending!(settle.poll());
    }

    #[tokio::test]
    async fn test_subscriber_sees_commit() {
        let mut orchestrator = orchestrator();
        let mut rx = orchestrator.subscribe();

        orchestrator.start_cycle(AccountId::new("a"), 1).unwrap();
        orchestrator.apply(recent_ok(1));
        orchestrator.apply(full_ok(1));

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.status, CycleStatus::Ready);
        assert_eq!(seen.snapshot.identifier, Some(AccountId::new("a")));
    }
}
