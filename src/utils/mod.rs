// Utility functions

use chrono::{DateTime, SubsecRound, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// =============================================================================
// Path Helpers
// =============================================================================

/// Default data directory (`~/.intel-dashboard`) used when no `dataDir` is configured.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".intel-dashboard")
}

/// Get the config.toml path inside a data directory.
#[inline]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

// =============================================================================
// Time Helpers
// =============================================================================

/// Current time truncated to whole milliseconds.
///
/// Everything the engine stamps goes through this so that a value survives an
/// ISO-8601 round trip through storage unchanged.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Serde adapter for `DateTime<Utc>` stored as an ISO-8601 string with
/// millisecond precision.
///
/// Deserialization also accepts epoch milliseconds, which is how legacy
/// snapshots wrote insight timestamps.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        deserializer.deserialize_any(TimestampVisitor)
    }

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an ISO-8601 timestamp string or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("invalid timestamp '{}': {}", v, e)))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Utc.timestamp_millis_opt(v)
                .single()
                .ok_or_else(|| E::custom(format!("epoch millis out of range: {}", v)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let millis = i64::try_from(v)
                .map_err(|_| E::custom(format!("epoch millis out of range: {}", v)))?;
            self.visit_i64(millis)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            self.visit_i64(v as i64)
        }
    }
}

// =============================================================================
// Locking
// =============================================================================

/// Safely acquire a mutex lock, recovering from poisoning by returning the guard.
/// The engine's state is replaced wholesale on every update, so a guard left
/// behind by a panicking thread still holds a complete value.
pub fn lock_mutex_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Mutex was poisoned, recovering: {}", poisoned);
            poisoned.into_inner()
        }
    }
}

/// Generate a unique message ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
