// Dashboard store - owns the live dashboard state and keeps storage in step with it

use super::reconstruction::{reconstruct_with, ReconstructionMode};
use super::reducer::reduce_at;
use crate::file_storage::DashboardRepository;
use crate::models::{ChatMessage, DashboardState, IntelligencePayload};
use crate::parsers::EntityExtractor;
use crate::utils::{lock_mutex_recover, now_millis};
use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Where the state came from at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapSource {
    /// A stored snapshot was loaded
    Snapshot,
    /// Rebuilt from the transcript and written back to storage
    Reconstructed,
    /// Nothing stored and nothing to replay
    Empty,
}

/// Single owner of the live [`DashboardState`].
///
/// Every mutation goes through here and is persisted right after it is
/// applied. Storage failures never roll back the in-memory state.
pub struct DashboardStore {
    state: Mutex<DashboardState>,
    repository: DashboardRepository,
}

impl DashboardStore {
    pub fn new(repository: DashboardRepository) -> Self {
        Self {
            state: Mutex::new(DashboardState::default()),
            repository,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DashboardState {
        lock_mutex_recover(&self.state).clone()
    }

    /// Load the stored snapshot, or rebuild from `transcript` when there is none.
    pub fn bootstrap<E: EntityExtractor + ?Sized>(
        &self,
        transcript: &[ChatMessage],
        mode: ReconstructionMode,
        extractor: &E,
    ) -> BootstrapSource {
        if let Some(state) = self.repository.load() {
            log::info!("Dashboard restored from snapshot");
            *lock_mutex_recover(&self.state) = state;
            return BootstrapSource::Snapshot;
        }

        let state = reconstruct_with(transcript, mode, extractor);
        if state.is_empty() {
            *lock_mutex_recover(&self.state) = state;
            return BootstrapSource::Empty;
        }

        self.repository.save(&state);
        *lock_mutex_recover(&self.state) = state;
        BootstrapSource::Reconstructed
    }

    /// Fold one analysis into the dashboard and persist the result.
    pub fn apply_intelligence(&self, payload: &IntelligencePayload, target: &str) -> DashboardState {
        self.apply_intelligence_at(payload, target, now_millis())
    }

    /// [`apply_intelligence`](Self::apply_intelligence) with an explicit insight timestamp.
    pub fn apply_intelligence_at(
        &self,
        payload: &IntelligencePayload,
        target: &str,
        now: DateTime<Utc>,
    ) -> DashboardState {
        let mut state = lock_mutex_recover(&self.state);
        let next = reduce_at(&state, payload, target, now);
        self.repository.save(&next);
        *state = next.clone();
        next
    }

    /// Record the user's own company unless one is already known.
    ///
    /// Returns whether the state changed.
    pub fn resolve_user_company(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let mut state = lock_mutex_recover(&self.state);
        if state.user_company.is_some() {
            return false;
        }

        state.user_company = Some(name.to_string());
        log::info!("User company set to {}", name);
        self.repository.save(&state);
        true
    }

    /// Clear the state and the stored snapshot.
    pub fn reset(&self) {
        *lock_mutex_recover(&self.state) = DashboardState::default();
        self.repository.reset();
        log::info!("Dashboard reset");
    }
}
