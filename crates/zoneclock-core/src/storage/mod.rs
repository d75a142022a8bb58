//! Persistence port and its implementations.
//!
//! [`Storage`] is what the session manager talks to. Implementors provide a
//! string key-value store plus append/load of cycle records; settings, flags
//! and every statistics query are layered on top as provided methods.

mod config;
pub mod database;
mod memory;
pub mod migrations;

pub use config::{
    get_json_value_by_path, set_json_value_by_path, AudioBackend, Config, NotifierBackend,
};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::cycle::CycleRecord;
use crate::error::{ConfigError, StorageError};
use crate::settings::Settings;
use crate::stats::{self, DailyStatistics, PeakHour, Trend, WeekdayFocus};

/// Keys used in the key-value store.
pub mod keys {
    pub const SETTINGS: &str = "settings";
    pub const DND_ENABLED: &str = "dnd_enabled";
    pub const NOTIFICATION_ENABLED: &str = "notification_enabled";
    pub const ONBOARDING_COMPLETED: &str = "onboarding_completed";
    /// Written while a cycle runs. Only a hint; nothing rebuilds a cycle from it.
    pub const CURRENT_CYCLE_ID: &str = "current_cycle_id";
}

/// Returns `~/.config/zoneclock[-dev]/` based on ZONECLOCK_ENV.
///
/// Set ZONECLOCK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ZONECLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("zoneclock-dev")
    } else {
        base_dir.join("zoneclock")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

pub trait Storage: Send + Sync {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn kv_remove(&self, key: &str) -> Result<(), StorageError>;

    /// Append one record. Must be all-or-nothing.
    fn save_cycle_record(&self, record: &CycleRecord) -> Result<(), StorageError>;

    /// Every record, oldest first.
    fn load_all_cycle_records(&self) -> Result<Vec<CycleRecord>, StorageError>;

    // ── Settings & flags ─────────────────────────────────────────────

    /// Stored settings, or defaults when missing, unreadable or invalid.
    fn load_settings(&self) -> Settings {
        let raw = match self.kv_get(keys::SETTINGS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Settings::default(),
            Err(e) => {
                warn!(error = %e, "failed to read settings, using defaults");
                return Settings::default();
            }
        };
        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) if settings.is_valid() => settings,
            Ok(_) => {
                warn!("stored settings fail validation, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(error = %e, "stored settings are corrupt, using defaults");
                Settings::default()
            }
        }
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let json = serde_json::to_string(settings)?;
        self.kv_set(keys::SETTINGS, &json)
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.kv_get(key), Ok(Some(v)) if v == "true")
    }

    fn set_flag(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.kv_set(key, if value { "true" } else { "false" })
    }

    fn current_cycle_hint(&self) -> Option<String> {
        self.kv_get(keys::CURRENT_CYCLE_ID).ok().flatten()
    }

    fn set_current_cycle_hint(&self, cycle_id: &str) -> Result<(), StorageError> {
        self.kv_set(keys::CURRENT_CYCLE_ID, cycle_id)
    }

    fn clear_current_cycle_hint(&self) -> Result<(), StorageError> {
        self.kv_remove(keys::CURRENT_CYCLE_ID)
    }

    // ── Statistics ───────────────────────────────────────────────────

    fn statistics_for_day(&self, day: NaiveDate) -> Result<DailyStatistics, StorageError> {
        let records = self.load_all_cycle_records()?;
        let break_minutes = self.load_settings().break_duration;
        Ok(stats::statistics_for_day(&records, day, break_minutes))
    }

    fn statistics_for_today(&self) -> Result<DailyStatistics, StorageError> {
        self.statistics_for_day(Utc::now().date_naive())
    }

    fn statistics_for_last_7_days(&self) -> Result<Vec<DailyStatistics>, StorageError> {
        let records = self.load_all_cycle_records()?;
        let break_minutes = self.load_settings().break_duration;
        Ok(stats::statistics_for_last_7_days(
            &records,
            Utc::now().date_naive(),
            break_minutes,
        ))
    }

    fn statistics_for_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DailyStatistics, StorageError> {
        let records = self.load_all_cycle_records()?;
        let break_minutes = self.load_settings().break_duration;
        Ok(stats::statistics_for_range(&records, start, end, break_minutes))
    }

    fn trend_30_days(&self) -> Result<Trend, StorageError> {
        let records = self.load_all_cycle_records()?;
        Ok(stats::trend_30_days(&records, Utc::now()))
    }

    fn peak_focus_hours(&self, top_n: usize) -> Result<Vec<PeakHour>, StorageError> {
        let records = self.load_all_cycle_records()?;
        Ok(stats::peak_focus_hours(&records, top_n))
    }

    fn weekly_pattern(&self) -> Result<Vec<WeekdayFocus>, StorageError> {
        let records = self.load_all_cycle_records()?;
        Ok(stats::weekly_pattern(&records))
    }
}
