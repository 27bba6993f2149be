//! Ownership of the current account identifier.

use crate::{
    orchestrator::{Applied, FetchOrchestrator},
    snapshot::StatsState,
    source::ActivitySource,
};
use playstats_common::{AccountId, Result, StatsError};
use std::{num::NonZeroUsize, sync::Arc};
use tokio::sync::watch;
use tracing::{info, instrument};

/// Owns the current identifier and the generation counter.
///
/// Every submission, including a re-submission of the same identifier,
/// starts a new generation. Results of earlier generations become inert.
#[derive(Debug)]
pub struct IdentityController {
    current: Option<AccountId>,
    generation: u64,
    orchestrator: FetchOrchestrator,
}

impl IdentityController {
    /// Creates a controller with no identifier and an empty snapshot.
    pub fn new(source: Arc<dyn ActivitySource>, limit: NonZeroUsize) -> Self {
        Self {
            current: None,
            generation: 0,
            orchestrator: FetchOrchestrator::new(source, limit),
        }
    }

    /// The identifier of the latest submission, if any.
    pub const fn current(&self) -> Option<&AccountId> {
        self.current.as_ref()
    }

    /// The active generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the active cycle has outstanding retrievals.
    pub const fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    /// Copy of the published state.
    pub fn state(&self) -> StatsState {
        self.orchestrator.state()
    }

    /// Receiver observing every published state.
    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.orchestrator.subscribe()
    }

    /// Submits an identifier and starts a cycle for it, returning the new
    /// generation. Must be called inside a tokio runtime.
    #[instrument(skip(self, identifier), fields(identifier = %identifier))]
    pub fn submit(&mut self, identifier: AccountId) -> Result<u64> {
        if identifier.is_empty() {
            return Err(StatsError::validation_field(
                "Identifier cannot be empty",
                "identifier",
            ));
        }

        let generation = self.generation + 1;
        self.orchestrator.start_cycle(identifier.clone(), generation)?;
        self.generation = generation;
        self.current = Some(identifier);
        info!(generation, "Identifier submitted");
        Ok(generation)
    }

    /// Re-submits the current identifier under a new generation.
    ///
    /// Returns `None` when no identifier has been submitted.
    pub fn refresh(&mut self) -> Result<Option<u64>> {
        match self.current.clone() {
            Some(identifier) => self.submit(identifier).map(Some),
            None => Ok(None),
        }
    }

    /// Forgets the identifier, invalidates in-flight work and publishes an
    /// empty snapshot.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.current = None;
        self.orchestrator.reset(self.generation);
        info!(generation = self.generation, "Identifier cleared");
    }

    /// Applies the next settled retrieval.
    pub async fn process_next(&mut self) -> Option<Applied> {
        self.orchestrator.process_next().await
    }

    /// Waits until the active cycle settles and returns the published state.
    pub async fn settle(&mut self) -> StatsState {
        self.orchestrator.settle().await
    }
}
