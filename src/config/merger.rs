// Configuration merging with priority

use crate::config::loader::{BackendConfig, DashboardConfig, EngineConfig, StorageConfig};
use crate::dashboard::ReconstructionMode;
use serde::{Deserialize, Serialize};

/// Partial configuration for merging
/// Uses Option<T> for all fields so an unset key never hides a lower layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PartialConfig {
    #[serde(default)]
    pub storage: Option<PartialStorageConfig>,
    #[serde(default)]
    pub engine: Option<PartialEngineConfig>,
    #[serde(default)]
    pub backend: Option<PartialBackendConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PartialStorageConfig {
    #[serde(rename = "dataDir", alias = "data_dir", default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(rename = "dashboardKey", alias = "dashboard_key", default, skip_serializing_if = "Option::is_none")]
    pub dashboard_key: Option<String>,
    #[serde(rename = "transcriptKey", alias = "transcript_key", default, skip_serializing_if = "Option::is_none")]
    pub transcript_key: Option<String>,
    #[serde(rename = "maxHistory", alias = "max_history", default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PartialEngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconstruction: Option<ReconstructionMode>,
    #[serde(rename = "clarificationPrompt", alias = "clarification_prompt", default, skip_serializing_if = "Option::is_none")]
    pub clarification_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PartialBackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(rename = "timeoutSecs", alias = "timeout_secs", default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Configuration merger
/// Priority order: CLI -> Project -> Global -> Defaults
pub struct ConfigMerger {
    defaults: DashboardConfig,
    global: Option<PartialConfig>,
    project: Option<PartialConfig>,
    cli: Option<PartialConfig>,
}

impl ConfigMerger {
    /// Create a new config merger with defaults
    pub fn new() -> Self {
        Self {
            defaults: DashboardConfig::default(),
            global: None,
            project: None,
            cli: None,
        }
    }

    /// Set global config
    pub fn with_global(mut self, config: Option<PartialConfig>) -> Self {
        self.global = config;
        self
    }

    /// Set project config
    pub fn with_project(mut self, config: Option<PartialConfig>) -> Self {
        self.project = config;
        self
    }

    /// Set CLI overrides
    pub fn with_cli(mut self, config: Option<PartialConfig>) -> Self {
        self.cli = config;
        self
    }

    /// Merge all configs with priority
    pub fn merge(&self) -> DashboardConfig {
        [&self.global, &self.project, &self.cli]
            .into_iter()
            .flatten()
            .fold(self.defaults.clone(), |result, layer| {
                self.merge_partial(&result, layer)
            })
    }

    /// Merge partial config into full config
    fn merge_partial(&self, base: &DashboardConfig, partial: &PartialConfig) -> DashboardConfig {
        DashboardConfig {
            storage: partial
                .storage
                .as_ref()
                .map(|p| self.merge_partial_storage(&base.storage, p))
                .unwrap_or_else(|| base.storage.clone()),
            engine: partial
                .engine
                .as_ref()
                .map(|p| self.merge_partial_engine(&base.engine, p))
                .unwrap_or_else(|| base.engine.clone()),
            backend: partial
                .backend
                .as_ref()
                .map(|p| self.merge_partial_backend(&base.backend, p))
                .unwrap_or_else(|| base.backend.clone()),
        }
    }

    fn merge_partial_storage(&self, base: &StorageConfig, partial: &PartialStorageConfig) -> StorageConfig {
        StorageConfig {
            data_dir: partial.data_dir.clone().or_else(|| base.data_dir.clone()),
            dashboard_key: partial
                .dashboard_key
                .clone()
                .unwrap_or_else(|| base.dashboard_key.clone()),
            transcript_key: partial
                .transcript_key
                .clone()
                .unwrap_or_else(|| base.transcript_key.clone()),
            max_history: partial.max_history.unwrap_or(base.max_history),
        }
    }

    fn merge_partial_engine(&self, base: &EngineConfig, partial: &PartialEngineConfig) -> EngineConfig {
        EngineConfig {
            reconstruction: partial.reconstruction.unwrap_or(base.reconstruction),
            clarification_prompt: partial
                .clarification_prompt
                .clone()
                .unwrap_or_else(|| base.clarification_prompt.clone()),
        }
    }

    fn merge_partial_backend(&self, base: &BackendConfig, partial: &PartialBackendConfig) -> BackendConfig {
        BackendConfig {
            endpoint: partial.endpoint.clone().or_else(|| base.endpoint.clone()),
            timeout_secs: partial.timeout_secs.unwrap_or(base.timeout_secs),
        }
    }
}

impl Default for ConfigMerger {
    fn default() -> Self {
        Self::new()
    }
}
