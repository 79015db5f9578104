//! Durable key-value persistence for the serialized ledger pieces. The core
//! only ever asks a store to save, load or remove opaque string blobs; what
//! the blobs contain is the service's business.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::LedgerError;

const DB_FILE: &str = "tripsplit.db";

/// Persistence seam: string blobs under string keys.
pub trait BlobStore: Send {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), LedgerError>;
    fn load(&self, key: &str) -> Result<Option<String>, LedgerError>;
    fn remove(&mut self, key: &str) -> Result<(), LedgerError>;
}

/// SQLite-backed store: a single `kv` table with upsert semantics.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database inside `dir`.
    pub fn open(dir: &Path) -> Result<Self, LedgerError> {
        std::fs::create_dir_all(dir).map_err(|e| LedgerError::Storage(e.to_string()))?;
        let conn = Connection::open(dir.join(DB_FILE))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
        )?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteStore {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), LedgerError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, blob],
        )?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }

    fn remove(&mut self, key: &str) -> Result<(), LedgerError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory store for tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn save(&mut self, key: &str, blob: &str) -> Result<(), LedgerError> {
        self.map.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.map.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<(), LedgerError> {
        self.map.remove(key);
        Ok(())
    }
}
