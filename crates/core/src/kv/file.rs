//! JSON-file backed key/value store
//!
//! The whole store is one JSON object on disk. Writes go to a sibling temp
//! file which is then renamed over the original, so readers never observe a
//! half-written file. [`JsonFileStore::watch`] attaches a `notify` watcher so
//! edits made by another process show up as change notifications.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ChangeHub, ChangeSubscription, KeyValueStore, StorageChange};
use crate::errors::{DockError, Result};

type Entries = BTreeMap<String, Value>;

/// Store persisted as a single JSON object file
pub struct JsonFileStore {
    path:     PathBuf,
    hub:      ChangeHub,
    /// Last contents this process wrote or observed
    snapshot: Arc<Mutex<Entries>>,
    /// Serializes read-modify-write of the file within this process
    write_lock: tokio::sync::Mutex<()>,
    watcher:  Mutex<Option<RecommendedWatcher>>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`
    ///
    /// The file itself is only created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let snapshot = read_entries_sync(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "store file unreadable, starting empty");
            Entries::new()
        });

        Ok(Self {
            path,
            hub: ChangeHub::new(),
            snapshot: Arc::new(Mutex::new(snapshot)),
            write_lock: tokio::sync::Mutex::new(()),
            watcher: Mutex::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching the file for changes made by other processes
    ///
    /// Calling it twice is a no-op.
    pub fn watch(&self) -> Result<()> {
        let mut slot = self.watcher.lock().unwrap();
        if slot.is_some() {
            return Ok(());
        }

        let path = self.path.clone();
        let file_name = path.file_name().map(|n| n.to_os_string());
        let snapshot = Arc::clone(&self.snapshot);
        let hub = self.hub.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "store watcher error");
                    return;
                },
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            let touches_store = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if !touches_store {
                return;
            }

            let current = match read_entries_sync(&path) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(error = %err, "store file mid-write, skipping event");
                    return;
                },
            };
            let changes = {
                let mut known = snapshot.lock().unwrap();
                let changes = diff_entries(&known, &current);
                *known = current;
                changes
            };
            if !changes.is_empty() {
                debug!(count = changes.len(), "external store change");
                hub.broadcast(&changes);
            }
        })?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        *slot = Some(watcher);
        Ok(())
    }

    async fn read_entries(&self) -> Result<Entries> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => parse_entries(&text, &self.path),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(err) => Err(DockError::StorageError(format!(
                "failed to read {}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    async fn write_entries(&self, previous: &Entries, entries: Entries) -> Result<Vec<StorageChange>> {
        let text = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        let changes = diff_entries(previous, &entries);

        // Record what we are about to write before it lands, so our own watcher
        // sees no difference and does not echo the change a second time.
        let prior_snapshot = std::mem::replace(&mut *self.snapshot.lock().unwrap(), entries);

        let result = async {
            tokio::fs::write(&tmp, text).await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(err) = result {
            *self.snapshot.lock().unwrap() = prior_snapshot;
            return Err(DockError::StorageError(format!(
                "failed to write {}: {}",
                self.path.display(),
                err
            )));
        }
        Ok(changes)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let entries = self.read_entries().await?;
        Ok(entries.get(key).cloned())
    }

    async fn set_many(&self, entries: Vec<(String, Value)>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let previous = self.read_entries().await?;
        let mut next = previous.clone();
        for (key, value) in entries {
            next.insert(key, value);
        }
        if next == previous {
            return Ok(());
        }
        let changes = self.write_entries(&previous, next).await?;
        self.hub.broadcast(&changes);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let previous = self.read_entries().await?;
        if !previous.contains_key(key) {
            return Ok(());
        }
        let mut next = previous.clone();
        next.remove(key);
        let changes = self.write_entries(&previous, next).await?;
        self.hub.broadcast(&changes);
        Ok(())
    }

    fn subscribe(&self) -> ChangeSubscription {
        self.hub.subscribe()
    }
}

fn parse_entries(text: &str, path: &Path) -> Result<Entries> {
    if text.trim().is_empty() {
        return Ok(Entries::new());
    }
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(DockError::StorageError(format!(
            "{} does not hold a JSON object",
            path.display()
        ))),
    }
}

fn read_entries_sync(path: &Path) -> Result<Entries> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_entries(&text, path),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Entries::new()),
        Err(err) => Err(err.into()),
    }
}

/// Keys whose value differs between two snapshots
fn diff_entries(before: &Entries, after: &Entries) -> Vec<StorageChange> {
    let mut changes = Vec::new();
    for (key, value) in after {
        if before.get(key) != Some(value) {
            changes.push(StorageChange {
                key:       key.clone(),
                new_value: Some(value.clone()),
            });
        }
    }
    for key in before.keys() {
        if !after.contains_key(key) {
            changes.push(StorageChange {
                key:       key.clone(),
                new_value: None,
            });
        }
    }
    changes
}
