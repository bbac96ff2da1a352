//! File-based storage for the intelligence dashboard
//!
//! Everything the engine persists goes through a small key-value seam
//! ([`store::KeyValueStore`]) so the dashboard snapshot and the chat transcript
//! survive restarts without the engine caring where they live.
//!
//! ## Storage Layout
//!
//! Data directory (`~/.intel-dashboard/` unless configured):
//! - `cc-intelligence-dashboard-data.json` - Versioned dashboard snapshot
//! - `cc-intelligence-dashboard-chat.json` - Chat transcript (capped)
//! - `config.toml` - Project-level configuration

pub mod chat;
pub mod dashboard;
pub mod store;

pub use chat::{TranscriptRepository, DEFAULT_MAX_HISTORY, DEFAULT_TRANSCRIPT_KEY};
pub use dashboard::{DashboardRepository, DASHBOARD_SNAPSHOT_VERSION, DEFAULT_DASHBOARD_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};

use std::fs;
use std::path::{Path, PathBuf};

/// Common file operations result type
pub type FileResult<T> = Result<T, String>;

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> FileResult<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Failed to create directory {:?}: {}", path, e))?;
    }
    Ok(())
}

/// Write data to a file atomically (temp file + rename)
pub fn atomic_write(path: &Path, content: &str) -> FileResult<()> {
    let temp_path = path.with_extension("tmp");

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    fs::write(&temp_path, content)
        .map_err(|e| format!("Failed to write temp file {:?}: {}", temp_path, e))?;

    fs::rename(&temp_path, path)
        .map_err(|e| format!("Failed to rename {:?} to {:?}: {}", temp_path, path, e))?;

    Ok(())
}

/// Initialize the data directory with a .gitignore for stray temp files
pub fn init_data_dir(data_dir: &Path) -> FileResult<PathBuf> {
    ensure_dir(data_dir)?;

    let gitignore_path = data_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, "# Interrupted atomic writes\n*.tmp\n")
            .map_err(|e| format!("Failed to write .gitignore: {}", e))?;
    }

    Ok(data_dir.to_path_buf())
}
