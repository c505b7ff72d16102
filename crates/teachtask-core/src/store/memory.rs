//! In-process record store, for tests and embedding.

use super::{Record, RecordStore, StoreError};
use crate::model::{Item, Variant};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

type Key = (String, Variant);

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<Key, Record>>,
    offline: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails with [`StoreError::Remote`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Key, Record>>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("store is offline".to_string()));
        }
        self.records
            .lock()
            .map_err(|_| StoreError::Remote("store lock poisoned".to_string()))
    }

    fn write(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut records = self.lock()?;
        let record = records
            .get_mut(&(user_id.to_string(), variant))
            .ok_or_else(|| StoreError::NotFound {
                user_id: user_id.to_string(),
                variant,
            })?;

        match expected {
            Some(expected) if record.revision != expected => {
                return Err(StoreError::Conflict {
                    user_id: user_id.to_string(),
                    variant,
                    expected,
                    actual: record.revision,
                });
            }
            _ => {}
        }

        record.items = items.to_vec();
        record.order = items.len();
        record.revision += 1;
        Ok(record.revision)
    }
}

impl RecordStore for MemoryStore {
    fn ensure_record(&self, user_id: &str, variant: Variant) -> Result<bool, StoreError> {
        let mut records = self.lock()?;
        let key = (user_id.to_string(), variant);
        if records.contains_key(&key) {
            return Ok(false);
        }
        records.insert(key, Record::empty(user_id, variant));
        Ok(true)
    }

    fn fetch(&self, user_id: &str, variant: Variant) -> Result<Record, StoreError> {
        self.lock()?
            .get(&(user_id.to_string(), variant))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                user_id: user_id.to_string(),
                variant,
            })
    }

    fn replace_all(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
    ) -> Result<u64, StoreError> {
        self.write(user_id, variant, items, None)
    }

    fn replace_if_revision(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
        expected: u64,
    ) -> Result<u64, StoreError> {
        self.write(user_id, variant, items, Some(expected))
    }
}
