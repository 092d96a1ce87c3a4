//! Key/value persistence substrate
//!
//! The storage manager only needs an async string-keyed JSON store that can
//! tell every interested party when a key changes, including changes made by
//! another process sharing the same backing data. Two implementations ship:
//!
//! - `memory` - in-process map, every instance sharing it sees every write
//! - `file` - single JSON file on disk, optionally watched for outside edits

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;

pub mod file;
pub mod hub;
pub mod memory;

pub use file::JsonFileStore;
pub use hub::{ChangeHub, ChangeSubscription};
pub use memory::MemoryStore;

/// One key changed in the substrate
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key:       String,
    /// Value after the change, `None` when the key was removed
    pub new_value: Option<Value>,
}

/// Async key/value store with change notification
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read one key
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write several keys as a single operation
    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()>;

    /// Write one key
    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.set_many(vec![(key.to_string(), value)]).await
    }

    /// Delete one key; deleting a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// Receive every subsequent change to any key
    fn subscribe(&self) -> ChangeSubscription;
}
