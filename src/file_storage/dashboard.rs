//! Dashboard snapshot storage
//!
//! The snapshot is the `DashboardState` JSON object plus a `version` field.
//! Snapshots without a version were written by the first release and are
//! migrated on load. Anything unreadable is reported as absent so the caller
//! can rebuild from the transcript instead.

use super::store::KeyValueStore;
use crate::models::DashboardState;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Version of the dashboard snapshot format
pub const DASHBOARD_SNAPSHOT_VERSION: u32 = 2;

/// Storage key for the dashboard snapshot
pub const DEFAULT_DASHBOARD_KEY: &str = "cc-intelligence-dashboard-data";

/// Version assumed for snapshots that carry none
const LEGACY_SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    #[serde(flatten)]
    state: &'a DashboardState,
}

/// Load/save/reset of the dashboard snapshot. Never propagates storage errors.
#[derive(Clone)]
pub struct DashboardRepository {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl DashboardRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_DASHBOARD_KEY)
    }

    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The persisted dashboard, or `None` if nothing usable is stored.
    pub fn load(&self) -> Option<DashboardState> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read dashboard snapshot: {}", e);
                return None;
            }
        };

        match parse_snapshot(&raw) {
            Ok(state) => {
                log::debug!(
                    "Loaded dashboard snapshot '{}' ({} targets)",
                    self.key,
                    state.target_companies.len()
                );
                Some(state)
            }
            Err(e) => {
                log::warn!("Ignoring dashboard snapshot '{}': {}", self.key, e);
                None
            }
        }
    }

    /// Persist `state`. Returns whether the snapshot reached storage.
    pub fn save(&self, state: &DashboardState) -> bool {
        let snapshot = SnapshotRef {
            version: DASHBOARD_SNAPSHOT_VERSION,
            state,
        };

        let content = match serde_json::to_string(&snapshot) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to serialize dashboard snapshot: {}", e);
                return false;
            }
        };

        match self.store.set(&self.key, &content) {
            Ok(()) => {
                log::debug!("Saved dashboard snapshot '{}'", self.key);
                true
            }
            Err(e) => {
                log::warn!("Dashboard snapshot not persisted: {}", e);
                false
            }
        }
    }

    /// Remove the stored snapshot. Returns whether storage confirmed it.
    pub fn reset(&self) -> bool {
        match self.store.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to remove dashboard snapshot: {}", e);
                false
            }
        }
    }
}

/// Parse and migrate a stored snapshot.
pub fn parse_snapshot(raw: &str) -> Result<DashboardState, String> {
    let mut value: Value =
        serde_json::from_str(raw).map_err(|e| format!("corrupt snapshot JSON: {}", e))?;

    let Some(object) = value.as_object_mut() else {
        return Err("snapshot is not a JSON object".to_string());
    };

    let version = match object.remove("version") {
        None | Some(Value::Null) => LEGACY_SNAPSHOT_VERSION,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("invalid snapshot version: {}", v))?,
    };

    if version > DASHBOARD_SNAPSHOT_VERSION {
        return Err(format!(
            "snapshot version {} is newer than supported version {}",
            version, DASHBOARD_SNAPSHOT_VERSION
        ));
    }

    if version < DASHBOARD_SNAPSHOT_VERSION {
        log::info!("Migrating dashboard snapshot from version {}", version);
        migrate_v1(&mut value);
    }

    serde_json::from_value(value).map_err(|e| format!("snapshot schema mismatch: {}", e))
}

/// v1 snapshots stored an empty string for an unknown user company and an
/// empty metrics object before the first analysis. Insight timestamps may be
/// epoch milliseconds, which the timestamp deserializer already accepts.
fn migrate_v1(value: &mut Value) {
    let Some(object) = value.as_object_mut() else {
        return;
    };

    if matches!(object.get("userCompany"), Some(Value::String(s)) if s.trim().is_empty()) {
        object.insert("userCompany".to_string(), Value::Null);
    }

    let metrics_without_probability = object
        .get("salesMetrics")
        .and_then(Value::as_object)
        .is_some_and(|metrics| {
            metrics
                .get("dealProbability")
                .map_or(true, |p| !p.is_number())
        });
    if metrics_without_probability {
        object.insert("salesMetrics".to_string(), Value::Null);
    }
}
