// Clippy allows for reasonable defaults
// These suppress warnings where the suggested change doesn't improve readability
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::field_reassign_with_default)] // Builder pattern is clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives
#![allow(clippy::clone_on_copy)] // .clone() can be clearer than implicit copy
#![allow(clippy::collapsible_if)] // Separate ifs can be more readable
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f
#![allow(clippy::unnecessary_lazy_evaluations)] // then(|| ..) reads the same as then_some

// Module declarations
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod file_storage;
mod models;
pub mod parsers;
pub mod utils;

// Re-export models for library consumers
pub use models::*;

use chat::{ChatOrchestrator, IntelligenceBackend};
use config::DashboardConfig;
use dashboard::DashboardStore;
use file_storage::{init_data_dir, DashboardRepository, FileStore, KeyValueStore, TranscriptRepository};
use std::sync::Arc;

/// Build a file-backed orchestrator from configuration.
///
/// Creates the data directory if needed. The caller still runs
/// [`ChatOrchestrator::bootstrap`] before the first turn.
pub fn open_orchestrator<B: IntelligenceBackend>(
    backend: B,
    config: &DashboardConfig,
) -> file_storage::FileResult<ChatOrchestrator<B>> {
    let data_dir = init_data_dir(&config.data_dir())?;
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));

    let dashboard = DashboardStore::new(DashboardRepository::with_key(
        store.clone(),
        config.storage.dashboard_key.clone(),
    ));
    let transcript = TranscriptRepository::new(store)
        .with_key(config.storage.transcript_key.clone())
        .with_max_history(config.storage.max_history);

    log::debug!("Opened dashboard storage in {:?}", data_dir);

    Ok(ChatOrchestrator::new(backend, dashboard, transcript)
        .with_reconstruction_mode(config.engine.reconstruction)
        .with_clarification_prompt(config.engine.clarification_prompt.clone()))
}
