use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{anyhow, Result};
use serde_json::Value;

use super::KeyValueStore;

/// In-memory store backed by `Arc<RwLock<HashMap>>`.
///
/// Cloning shares the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    storage: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let storage = self
            .storage
            .read()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(storage.get(key).cloned())
    }

    fn set_value(&self, key: &str, value: &Value) -> Result<()> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        storage.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn delete_value(&self, key: &str) -> Result<bool> {
        let mut storage = self
            .storage
            .write()
            .map_err(|_| anyhow!("store lock poisoned"))?;
        Ok(storage.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_delete() {
        let store = InMemoryStore::new();
        assert!(store.get_value("k").unwrap().is_none());

        store.set_value("k", &json!({"a": 1})).unwrap();
        assert_eq!(store.get_value("k").unwrap(), Some(json!({"a": 1})));

        assert!(store.delete_value("k").unwrap());
        assert!(!store.delete_value("k").unwrap());
    }

    #[test]
    fn clones_share_storage() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set_value("k", &json!("v")).unwrap();
        assert_eq!(other.get_value("k").unwrap(), Some(json!("v")));
    }
}
