// Configuration file loading

use crate::chat::{DEFAULT_BACKEND_TIMEOUT_SECS, DEFAULT_CLARIFICATION_PROMPT};
use crate::config::merger::{ConfigMerger, PartialConfig};
use crate::dashboard::ReconstructionMode;
use crate::file_storage::{FileStore, DEFAULT_DASHBOARD_KEY, DEFAULT_MAX_HISTORY, DEFAULT_TRANSCRIPT_KEY};
use crate::utils::{config_path, default_data_dir};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Dashboard configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    /// Where snapshots and transcripts are kept
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat engine behaviour
    #[serde(default)]
    pub engine: EngineConfig,
    /// Intelligence backend connection
    #[serde(default)]
    pub backend: BackendConfig,
}

impl DashboardConfig {
    /// Configured data directory, or `~/.intel-dashboard`.
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir)
    }
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory (defaults to ~/.intel-dashboard)
    #[serde(rename = "dataDir", alias = "data_dir", default)]
    pub data_dir: Option<String>,
    /// Key of the dashboard snapshot
    #[serde(rename = "dashboardKey", alias = "dashboard_key", default = "default_dashboard_key")]
    pub dashboard_key: String,
    /// Key of the chat transcript
    #[serde(rename = "transcriptKey", alias = "transcript_key", default = "default_transcript_key")]
    pub transcript_key: String,
    /// Messages kept in the stored transcript (0 keeps everything)
    #[serde(rename = "maxHistory", alias = "max_history", default = "default_max_history")]
    pub max_history: usize,
}

fn default_dashboard_key() -> String { DEFAULT_DASHBOARD_KEY.to_string() }
fn default_transcript_key() -> String { DEFAULT_TRANSCRIPT_KEY.to_string() }
fn default_max_history() -> usize { DEFAULT_MAX_HISTORY }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            dashboard_key: default_dashboard_key(),
            transcript_key: default_transcript_key(),
            max_history: default_max_history(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How to rebuild the dashboard when no snapshot is stored
    #[serde(default)]
    pub reconstruction: ReconstructionMode,
    /// Reply used when a turn names no company
    #[serde(rename = "clarificationPrompt", alias = "clarification_prompt", default = "default_clarification_prompt")]
    pub clarification_prompt: String,
}

fn default_clarification_prompt() -> String { DEFAULT_CLARIFICATION_PROMPT.to_string() }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reconstruction: ReconstructionMode::default(),
            clarification_prompt: default_clarification_prompt(),
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// HTTP endpoint the analysis request is POSTed to
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    #[serde(rename = "timeoutSecs", alias = "timeout_secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { DEFAULT_BACKEND_TIMEOUT_SECS }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Config loader
pub struct ConfigLoader {
    /// Global config path
    global_path: Option<PathBuf>,
    /// Project config path
    project_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            global_path: Self::get_global_config_path(),
            project_path: None,
        }
    }

    /// Read project config from `<data_dir>/config.toml`
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        self.project_path = Some(config_path(data_dir));
        self
    }

    /// Override the global config path
    pub fn with_global_path(mut self, path: Option<PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    /// Get the global config path
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("intel-dashboard").join("config.toml"))
    }

    /// Load global config
    pub fn load_global(&self) -> Result<Option<PartialConfig>> {
        if let Some(ref path) = self.global_path {
            self.load_from_path(path)
        } else {
            Ok(None)
        }
    }

    /// Load project config
    pub fn load_project(&self) -> Result<Option<PartialConfig>> {
        if let Some(ref path) = self.project_path {
            self.load_from_path(path)
        } else {
            Ok(None)
        }
    }

    /// Load config from a specific path
    ///
    /// Only the keys present in the file are set, so a layer never hides
    /// values from the layers below it.
    pub fn load_from_path(&self, path: &Path) -> Result<Option<PartialConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: PartialConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        validate_config(&ConfigMerger::new().with_cli(Some(config.clone())).merge())
            .map_err(|e| anyhow!("Invalid config file '{}': {}", path.display(), e))?;

        Ok(Some(config))
    }

    /// Get the global config path
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the project config path
    pub fn project_config_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Save config to project path
    pub fn save_project(&self, config: &DashboardConfig) -> Result<PathBuf> {
        let path = self
            .project_path
            .as_ref()
            .ok_or_else(|| anyhow!("No project config path available"))?;
        self.save_to_path(path, config)?;
        Ok(path.clone())
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path, config: &DashboardConfig) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| anyhow!("Failed to create config directory '{}': {}", parent.display(), e))?;
            }
        }

        validate_config(config)?;

        let contents = toml::to_string_pretty(config)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write config file '{}': {}", path.display(), e))?;

        log::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate config values
pub fn validate_config(config: &DashboardConfig) -> Result<()> {
    let key_check = FileStore::new(".");
    for (name, key) in [
        ("dashboardKey", &config.storage.dashboard_key),
        ("transcriptKey", &config.storage.transcript_key),
    ] {
        key_check
            .key_path(key)
            .map_err(|e| anyhow!("storage.{} is invalid: {}", name, e))?;
    }

    if config.storage.dashboard_key == config.storage.transcript_key {
        return Err(anyhow!("storage.dashboardKey and storage.transcriptKey must differ"));
    }

    if config.backend.timeout_secs == 0 {
        return Err(anyhow!("backend.timeoutSecs must be greater than 0"));
    }

    if let Some(ref endpoint) = config.backend.endpoint {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(anyhow!("backend.endpoint must be an http(s) URL, got '{}'", endpoint));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.storage.dashboard_key, "cc-intelligence-dashboard-data");
        assert_eq!(config.storage.transcript_key, "cc-intelligence-dashboard-chat");
        assert_eq!(config.storage.max_history, 100);
        assert_eq!(config.engine.reconstruction, ReconstructionMode::FullReplay);
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(config.backend.endpoint.is_none());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_loads_global_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config_content = r#"
[storage]
max_history = 20

[engine]
reconstruction = "latest_only"

[backend]
endpoint = "https://intel.example.com/analyze"
timeoutSecs = 10
"#;
        fs::write(&path, config_content).unwrap();

        let loader = ConfigLoader::new().with_global_path(Some(path));
        let partial = loader.load_global().unwrap().unwrap();

        // Keys absent from the file stay unset
        assert_eq!(partial.storage.as_ref().unwrap().dashboard_key, None);

        let config = ConfigMerger::new().with_global(Some(partial)).merge();
        assert_eq!(config.storage.max_history, 20);
        assert_eq!(config.engine.reconstruction, ReconstructionMode::LatestOnly);
        assert_eq!(config.backend.endpoint.as_deref(), Some("https://intel.example.com/analyze"));
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.storage.dashboard_key, DEFAULT_DASHBOARD_KEY);
    }

    #[test]
    fn test_loads_project_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.toml"),
            "[engine]\nclarificationPrompt = \"Who are we researching?\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::new().with_data_dir(temp_dir.path());
        let partial = loader.load_project().unwrap().unwrap();

        assert_eq!(
            partial.engine.unwrap().clarification_prompt.as_deref(),
            Some("Who are we researching?")
        );
        assert!(partial.storage.is_none());
        assert!(partial.backend.is_none());
    }

    #[test]
    fn test_handles_missing_config_files_gracefully() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new()
            .with_global_path(None)
            .with_data_dir(temp_dir.path());

        assert!(loader.load_global().unwrap().is_none());
        assert!(loader.load_project().unwrap().is_none());
    }

    #[test]
    fn test_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let loader = ConfigLoader::new().with_global_path(None);

        for bad in [
            "[backend]\ntimeoutSecs = 0\n",
            "[backend]\nendpoint = \"ftp://example.com\"\n",
            "[storage]\ndashboardKey = \"../escape\"\n",
            "[storage]\ndashboardKey = \"same\"\ntranscriptKey = \"same\"\n",
            "[engine]\nreconstruction = \"sometimes\"\n",
        ] {
            fs::write(&path, bad).unwrap();
            assert!(loader.load_from_path(&path).is_err(), "should reject: {}", bad);
        }
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new()
            .with_global_path(None)
            .with_data_dir(&temp_dir.path().join("data"));

        let mut config = DashboardConfig::default();
        config.storage.max_history = 7;
        config.backend.endpoint = Some("http://localhost:8787".to_string());

        let path = loader.save_project(&config).unwrap();
        assert!(path.exists());

        let reloaded = ConfigMerger::new()
            .with_project(loader.load_project().unwrap())
            .merge();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_data_dir_falls_back_to_default() {
        let mut config = DashboardConfig::default();
        assert_eq!(config.data_dir(), default_data_dir());

        config.storage.data_dir = Some("/tmp/intel".to_string());
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/intel"));
    }
}
