//! In-process store, for tests and embedding without a database file.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::cycle::CycleRecord;
use crate::error::StorageError;

use super::Storage;

#[derive(Debug, Default)]
pub struct MemoryStore {
    kv: Mutex<HashMap<String, String>>,
    records: Mutex<Vec<CycleRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Storage for MemoryStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let kv = self.kv.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(kv.get(key).cloned())
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.lock().map_err(|_| StorageError::Poisoned)?;
        kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn kv_remove(&self, key: &str) -> Result<(), StorageError> {
        let mut kv = self.kv.lock().map_err(|_| StorageError::Poisoned)?;
        kv.remove(key);
        Ok(())
    }

    fn save_cycle_record(&self, record: &CycleRecord) -> Result<(), StorageError> {
        let mut records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        records.push(record.clone());
        Ok(())
    }

    fn load_all_cycle_records(&self) -> Result<Vec<CycleRecord>, StorageError> {
        let records = self.records.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(records.clone())
    }
}
