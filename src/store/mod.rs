pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::models::Ledger;

pub const STORAGE_KEY: &str = "bookings_v1";

// 0 means nothing was ever written
pub type Version = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub version: Version,
    pub ledger: Ledger,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("stored bookings are corrupt: {reason}")]
    Corrupt { version: Version, reason: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("ledger changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict { expected: Version, actual: Version },
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// `save_all` is a compare-and-swap: it only commits when the stored version
/// still equals `expected`, and returns the new version.
pub trait BookingStore: Send + Sync {
    fn load_all(&self) -> Result<Snapshot, StoreError>;
    fn save_all(&self, ledger: &Ledger, expected: Version) -> Result<Version, StoreError>;
    fn clear_all(&self) -> Result<(), StoreError>;
}

pub(crate) fn decode(raw: &str, version: Version) -> Result<Snapshot, StoreError> {
    serde_json::from_str(raw)
        .map(|ledger| Snapshot { version, ledger })
        .map_err(|e| StoreError::Corrupt {
            version,
            reason: e.to_string(),
        })
}

pub(crate) fn encode(ledger: &Ledger) -> Result<String, StoreError> {
    serde_json::to_string(ledger).map_err(|e| StoreError::Unavailable(e.to_string()))
}
