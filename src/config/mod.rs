// Layered configuration system

pub mod loader;
pub mod merger;

// Re-export main types
pub use loader::{
    validate_config, BackendConfig, ConfigLoader, DashboardConfig, EngineConfig, StorageConfig,
};
pub use merger::{
    ConfigMerger, PartialBackendConfig, PartialConfig, PartialEngineConfig, PartialStorageConfig,
};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Load and merge configuration from all sources
/// Priority: CLI -> Project -> Global -> Defaults
///
/// A config file that fails to parse or validate is skipped with a warning.
/// The merged result must still validate.
pub fn load_merged_config(
    data_dir: Option<&Path>,
    cli_overrides: Option<PartialConfig>,
) -> Result<DashboardConfig> {
    load_with(ConfigLoader::new(), data_dir, cli_overrides)
}

fn load_with(
    loader: ConfigLoader,
    data_dir: Option<&Path>,
    cli_overrides: Option<PartialConfig>,
) -> Result<DashboardConfig> {
    let loader = match data_dir {
        Some(path) => loader.with_data_dir(path),
        None => loader,
    };

    let global = loader.load_global().unwrap_or_else(|e| {
        log::warn!("Ignoring global config: {}", e);
        None
    });
    let project = loader.load_project().unwrap_or_else(|e| {
        log::warn!("Ignoring project config: {}", e);
        None
    });

    let config = ConfigMerger::new()
        .with_global(global)
        .with_project(project)
        .with_cli(cli_overrides)
        .merge();

    validate_config(&config)?;
    Ok(config)
}

/// Get config file paths for debugging
pub fn get_config_paths(data_dir: Option<&Path>) -> (Option<PathBuf>, Option<PathBuf>) {
    let loader = match data_dir {
        Some(path) => ConfigLoader::new().with_data_dir(path),
        None => ConfigLoader::new(),
    };

    (
        loader.global_config_path().map(|p| p.to_path_buf()),
        loader.project_config_path().map(|p| p.to_path_buf()),
    )
}
