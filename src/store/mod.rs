//! Persistence for progress records.
//!
//! Storage is reached through the minimal [`KeyValueStore`] contract. The
//! SQLite [`crate::db::Database`] implements it for real use and
//! [`InMemoryStore`] for tests and ephemeral sessions.

mod memory;
mod repository;

use anyhow::Result;
use serde_json::Value;

pub use memory::InMemoryStore;
pub use repository::{KvProgressRepository, ProgressRepository, DEFAULT_STORAGE_KEY};

/// A JSON-valued key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get_value(&self, key: &str) -> Result<Option<Value>>;

    /// Insert or overwrite.
    fn set_value(&self, key: &str, value: &Value) -> Result<()>;

    /// Returns true if a value existed.
    fn delete_value(&self, key: &str) -> Result<bool>;
}
