use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{decode, encode, BookingStore, Snapshot, StoreError, Version, STORAGE_KEY};
use crate::db;
use crate::models::Ledger;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(db::init_db(path)?))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("database lock poisoned".to_string()))
    }
}

fn to_version(v: i64) -> Result<Version, StoreError> {
    Version::try_from(v).map_err(|_| StoreError::Corrupt {
        version: 0,
        reason: format!("stored version {v} is negative"),
    })
}

fn to_sql_version(v: Version) -> Result<i64, StoreError> {
    i64::try_from(v).map_err(|_| StoreError::Unavailable(format!("version {v} out of range")))
}

fn current_version(conn: &Connection) -> Result<Version, StoreError> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT version FROM kv WHERE key = ?1",
            params![STORAGE_KEY],
            |row| row.get(0),
        )
        .optional()?;
    version.map(to_version).transpose().map(Option::unwrap_or_default)
}

impl BookingStore for SqliteStore {
    fn load_all(&self) -> Result<Snapshot, StoreError> {
        let conn = self.lock()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, version FROM kv WHERE key = ?1",
                params![STORAGE_KEY],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((raw, version)) => decode(&raw, to_version(version)?),
            None => Ok(Snapshot::default()),
        }
    }

    fn save_all(&self, ledger: &Ledger, expected: Version) -> Result<Version, StoreError> {
        let raw = encode(ledger)?;
        let conn = self.lock()?;

        let changed = if expected == 0 {
            conn.execute(
                "INSERT INTO kv (key, value, version) VALUES (?1, ?2, 1)
                 ON CONFLICT(key) DO NOTHING",
                params![STORAGE_KEY, raw],
            )?
        } else {
            conn.execute(
                "UPDATE kv SET value = ?1, version = version + 1, updated_at = datetime('now')
                 WHERE key = ?2 AND version = ?3",
                params![raw, STORAGE_KEY, to_sql_version(expected)?],
            )?
        };

        if changed == 0 {
            return Err(StoreError::VersionConflict {
                expected,
                actual: current_version(&conn)?,
            });
        }
        Ok(expected + 1)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE kv SET value = '{}', version = version + 1, updated_at = datetime('now')
             WHERE key = ?1",
            params![STORAGE_KEY],
        )?;
        Ok(())
    }
}
