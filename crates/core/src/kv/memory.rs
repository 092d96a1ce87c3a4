//! In-memory key/value store

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ChangeHub, ChangeSubscription, KeyValueStore, StorageChange};
use crate::errors::Result;

/// Process-local store
///
/// Wrap it in an `Arc` and hand the same instance to several storage managers
/// to model several tabs sharing one extension storage area.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
    hub:     ChangeHub,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with raw entries (no notifications fire)
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            entries: Mutex::new(map),
            hub:     ChangeHub::new(),
        }
    }

    /// Synchronous peek, used by tests and diagnostics
    pub fn snapshot(&self, key: &str) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let mut changes = Vec::with_capacity(entries.len());
        {
            let mut map = self.entries.lock().unwrap();
            for (key, value) in entries {
                if map.get(&key) == Some(&value) {
                    continue;
                }
                map.insert(key.clone(), value.clone());
                changes.push(StorageChange {
                    key,
                    new_value: Some(value),
                });
            }
        }
        self.hub.broadcast(&changes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = self.entries.lock().unwrap().remove(key).is_some();
        if removed {
            self.hub.broadcast(&[StorageChange {
                key:       key.to_string(),
                new_value: None,
            }]);
        }
        Ok(())
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.hub.subscribe()
    }
}
