pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use crate::store::KeyValueStore;

/// A stored key-value entry with its timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct KvEntry {
    pub key: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// SQLite-backed key-value storage. Clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "learnpath")
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("learnpath.db"))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Key-value operations
    // ============================================================

    pub fn get_entry(&self, key: &str) -> Result<Option<KvEntry>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT key, value, created_at, updated_at FROM kv_entries WHERE key = ?",
                [key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((key, raw, created_at, updated_at)) = row else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Stored value for {} is not valid JSON", key))?;
        let updated_at = parse_datetime(&updated_at);
        Ok(Some(KvEntry {
            key,
            value,
            created_at: created_at.as_deref().map(parse_datetime).unwrap_or(updated_at),
            updated_at,
        }))
    }

    pub fn set_entry(&self, key: &str, value: &Value) -> Result<()> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        let json = serde_json::to_string(value)?;

        conn.execute(
            "INSERT INTO kv_entries (key, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            (key, &json, &now),
        )?;
        Ok(())
    }

    pub fn delete_entry(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM kv_entries WHERE key = ?", [key])?;
        Ok(rows > 0)
    }
}

impl KeyValueStore for Database {
    fn get_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get_entry(key)?.map(|e| e.value))
    }

    fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        self.set_entry(key, value)
    }

    fn delete_value(&self, key: &str) -> Result<bool> {
        self.delete_entry(key)
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
