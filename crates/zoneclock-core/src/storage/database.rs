//! SQLite-backed store.
//!
//! Provides persistent storage for:
//! - Completed and stopped cycle records
//! - Key-value store for settings and flags

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cycle::CycleRecord;
use crate::error::StorageError;

use super::{data_dir, migrations, Storage};

pub const DEFAULT_DATABASE_FILE: &str = "zoneclock.db";

/// SQLite database for settings and cycle records.
///
/// The connection sits behind a mutex so the store can be shared between the
/// session manager and statistics readers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open `<data_dir>/<file_name>`, creating file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened
    /// or migrated.
    pub fn open(file_name: &str) -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| {
            StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
        })?;
        Self::open_path(dir.join(file_name))
    }

    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        migrations::migrate(&conn)?;
        info!(path = %path.display(), "opened cycle database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_time(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CycleRecord> {
    Ok(CycleRecord {
        id: parse_uuid(row, 0)?,
        cycle_id: parse_uuid(row, 1)?,
        started_at: parse_time(row, 2)?,
        ended_at: parse_time(row, 3)?,
        planned_minutes: row.get(4)?,
        actual_seconds: row.get(5)?,
        paused_seconds: row.get(6)?,
        micro_breaks: row.get(7)?,
        completion_rate: row.get(8)?,
        was_completed: row.get(9)?,
    })
}

impl Storage for SqliteStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn()?
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn save_cycle_record(&self, record: &CycleRecord) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT INTO cycle_records
                (id, cycle_id, started_at, ended_at, planned_minutes, actual_seconds,
                 paused_seconds, micro_breaks, completion_rate, was_completed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id.to_string(),
                record.cycle_id.to_string(),
                record.started_at.to_rfc3339(),
                record.ended_at.to_rfc3339(),
                record.planned_minutes,
                record.actual_seconds,
                record.paused_seconds,
                record.micro_breaks,
                record.completion_rate,
                record.was_completed,
            ],
        )?;
        debug!(cycle_id = %record.cycle_id, "inserted cycle record");
        Ok(())
    }

    fn load_all_cycle_records(&self) -> Result<Vec<CycleRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, cycle_id, started_at, ended_at, planned_minutes, actual_seconds,
                    paused_seconds, micro_breaks, completion_rate, was_completed
             FROM cycle_records
             ORDER BY ended_at ASC",
        )?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
