use std::sync::Mutex;

use super::{decode, encode, BookingStore, Snapshot, StoreError, Version};
use crate::models::Ledger;

#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Entry>,
}

#[derive(Debug, Default)]
struct Entry {
    version: Version,
    raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Entry {
                version: 1,
                raw: Some(raw.into()),
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Entry>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl BookingStore for MemoryStore {
    fn load_all(&self) -> Result<Snapshot, StoreError> {
        let entry = self.lock()?;
        match &entry.raw {
            Some(raw) => decode(raw, entry.version),
            None => Ok(Snapshot {
                version: entry.version,
                ledger: Ledger::new(),
            }),
        }
    }

    fn save_all(&self, ledger: &Ledger, expected: Version) -> Result<Version, StoreError> {
        let raw = encode(ledger)?;
        let mut entry = self.lock()?;
        if entry.version != expected {
            return Err(StoreError::VersionConflict {
                expected,
                actual: entry.version,
            });
        }
        entry.version += 1;
        entry.raw = Some(raw);
        Ok(entry.version)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let mut entry = self.lock()?;
        entry.version += 1;
        entry.raw = None;
        Ok(())
    }
}
