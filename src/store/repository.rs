use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use super::KeyValueStore;
use crate::error::PersistenceError;
use crate::models::{ProgressRecord, StoredProgress};

pub const DEFAULT_STORAGE_KEY: &str = "learning-progress";

/// Load/save access to the learner's progress record.
pub trait ProgressRepository: Send + Sync {
    /// The stored record, or a fresh one when nothing is stored or the stored
    /// value cannot be read. Read failures are logged, never returned.
    fn get(&self) -> ProgressRecord;

    fn save(&self, progress: &ProgressRecord) -> Result<(), PersistenceError>;

    fn reset(&self) -> Result<(), PersistenceError>;

    fn exists(&self) -> bool;
}

impl<T: ProgressRepository + ?Sized> ProgressRepository for Box<T> {
    fn get(&self) -> ProgressRecord {
        (**self).get()
    }

    fn save(&self, progress: &ProgressRecord) -> Result<(), PersistenceError> {
        (**self).save(progress)
    }

    fn reset(&self) -> Result<(), PersistenceError> {
        (**self).reset()
    }

    fn exists(&self) -> bool {
        (**self).exists()
    }
}

/// Progress stored as one JSON document under a single key.
#[derive(Clone)]
pub struct KvProgressRepository<S> {
    store: S,
    key: String,
}

/// Records written before `lastAccessed` was tracked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyProgress {
    completed_topics: Vec<String>,
    #[serde(default)]
    current_module: Option<String>,
    #[serde(default)]
    current_topic: Option<String>,
    #[serde(default)]
    notes: Option<BTreeMap<String, String>>,
}

impl<S: KeyValueStore> KvProgressRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn try_get(&self) -> Result<Option<ProgressRecord>> {
        let Some(value) = self.store.get_value(&self.key)? else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }

        if is_legacy_format(&value) {
            tracing::info!(key = %self.key, "Migrating legacy progress record");
            return Ok(Some(migrate_legacy_format(value)));
        }

        let stored: StoredProgress =
            serde_json::from_value(value).context("Failed to parse stored progress")?;
        let record = ProgressRecord::from_serializable(stored)
            .map_err(|e| anyhow!("Stored progress is invalid: {}", e))?;
        Ok(Some(record))
    }
}

impl<S: KeyValueStore> ProgressRepository for KvProgressRepository<S> {
    fn get(&self) -> ProgressRecord {
        match self.try_get() {
            Ok(Some(record)) => record,
            Ok(None) => ProgressRecord::new(),
            Err(e) => {
                tracing::warn!("Failed to load user progress, creating new: {:#}", e);
                ProgressRecord::new()
            }
        }
    }

    fn save(&self, progress: &ProgressRecord) -> Result<(), PersistenceError> {
        let value = serde_json::to_value(progress.to_serializable())
            .map_err(|e| PersistenceError::Save(e.to_string()))?;
        self.store
            .set_value(&self.key, &value)
            .map_err(|e| PersistenceError::Save(format!("{:#}", e)))?;
        tracing::debug!(
            key = %self.key,
            completed = progress.completed_topics().len(),
            "Saved user progress"
        );
        Ok(())
    }

    fn reset(&self) -> Result<(), PersistenceError> {
        self.store
            .delete_value(&self.key)
            .map_err(|e| PersistenceError::Reset(format!("{:#}", e)))?;
        tracing::info!(key = %self.key, "Reset user progress");
        Ok(())
    }

    fn exists(&self) -> bool {
        match self.store.get_value(&self.key) {
            Ok(value) => value.is_some_and(|v| !v.is_null()),
            Err(e) => {
                tracing::warn!("Failed to check for stored progress: {:#}", e);
                false
            }
        }
    }
}

/// An array of completed topics without a `lastAccessed` stamp.
fn is_legacy_format(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    let has_array = obj.get("completedTopics").is_some_and(Value::is_array);
    let has_timestamp = obj
        .get("lastAccessed")
        .is_some_and(|v| !v.is_null() && v.as_str() != Some(""));
    has_array && !has_timestamp
}

/// Upgrade a legacy record, stamping the migration time as last access.
/// Unreadable legacy data yields a fresh record.
fn migrate_legacy_format(value: Value) -> ProgressRecord {
    let migrated = serde_json::from_value::<LegacyProgress>(value)
        .map_err(|e| anyhow!(e))
        .and_then(|legacy| {
            ProgressRecord::from_parts(
                legacy.completed_topics,
                legacy.current_module,
                legacy.current_topic,
                legacy.notes.unwrap_or_default(),
                Utc::now(),
            )
            .map_err(|e| anyhow!(e))
        });

    match migrated {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Failed to migrate legacy format, creating new progress: {}", e);
            ProgressRecord::new()
        }
    }
}
