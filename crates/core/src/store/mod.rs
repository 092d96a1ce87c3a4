//! Prompt storage manager
//!
//! [`PromptStorage`] owns the versioned `{version, prompts, folders}` record in
//! a [`KeyValueStore`]. Every operation reads the whole record, changes it in
//! memory and writes it back in one `set_many` call that also refreshes the
//! legacy `prompts` mirror key.
//!
//! Writes made through one `PromptStorage` are serialized. Two instances
//! sharing a substrate (two tabs, two processes) are not coordinated: the
//! last full write wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::errors::{DockError, Result};
use crate::ids;
use crate::kv::{KeyValueStore, StorageChange};

pub mod model;
pub mod preferences;
pub mod schema;
pub mod transfer;

pub use model::{Folder, FolderPatch, NewFolder, NewPrompt, Prompt, PromptPatch, Store};
pub use preferences::Preferences;
pub use transfer::{ExportFile, ImportSource};

use model::{normalize_folder, normalize_folder_list, normalize_prompt, normalize_prompt_list, normalize_tags};
use schema::{migrate, Migration, LEGACY_PROMPTS_KEY, STORE_KEY};

/// Result of [`PromptStorage::save_prompt`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt:  Option<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:   Option<String>,
}

/// Versioned prompt/folder store on top of a key/value substrate
pub struct PromptStorage {
    kv:         Arc<dyn KeyValueStore>,
    clock:      Arc<dyn Clock>,
    write_lock: tokio::sync::Mutex<()>,
}

impl PromptStorage {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kv,
            clock,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_system_clock(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, Arc::new(SystemClock))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ========================================================================
    // Store I/O
    // ========================================================================

    /// Read, migrate and normalize the store
    ///
    /// Migrations and repairs are written back before returning. The write
    /// back happens under the instance write lock, against a fresh read, so
    /// it never lands on top of a concurrent mutation of this instance.
    pub async fn load_store(&self) -> Result<Store> {
        let migration = self.read_migrated().await?;
        if !migration.persist {
            return Ok(migration.store);
        }
        let _guard = self.write_lock.lock().await;
        self.load_store_locked().await
    }

    /// [`load_store`](Self::load_store) for callers already holding the write lock
    async fn load_store_locked(&self) -> Result<Store> {
        let migration = self.read_migrated().await?;
        if migration.persist {
            debug!(source = ?migration.source, "persisting migrated store");
            self.write_store(&migration.store).await?;
        }
        Ok(migration.store)
    }

    async fn read_migrated(&self) -> Result<Migration> {
        let canonical = self.kv.get(STORE_KEY).await?;
        let legacy = if canonical.is_none() {
            self.kv.get(LEGACY_PROMPTS_KEY).await?
        } else {
            None
        };
        Ok(migrate(canonical, legacy, self.clock.as_ref()))
    }

    /// Write the store under the canonical key and refresh the legacy mirror
    async fn write_store(&self, store: &Store) -> Result<()> {
        let canonical = serde_json::to_value(store)?;
        let legacy = serde_json::to_value(&store.prompts)?;
        self.kv
            .set_many(vec![
                (STORE_KEY.to_string(), canonical),
                (LEGACY_PROMPTS_KEY.to_string(), legacy),
            ])
            .await
    }

    /// Read-modify-write under the instance write lock
    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Store, &dyn Clock) -> Result<T>,
    {
        let _guard = self.write_lock.lock().await;
        let mut store = self.load_store_locked().await?;
        let out = f(&mut store, self.clock.as_ref())?;
        self.write_store(&store).await?;
        Ok(out)
    }

    // ========================================================================
    // Prompts
    // ========================================================================

    /// All prompts in stored order; empty on substrate failure
    pub async fn get_prompts(&self) -> Vec<Prompt> {
        match self.load_store().await {
            Ok(store) => store.prompts,
            Err(err) => {
                warn!(error = %err, "failed to read prompts, returning empty list");
                Vec::new()
            },
        }
    }

    /// One prompt by uuid
    pub async fn get_prompt(&self, uuid: &str) -> Option<Prompt> {
        self.get_prompts().await.into_iter().find(|p| p.uuid == uuid)
    }

    /// Replace the whole prompt list, keeping folders
    ///
    /// The given order is kept as-is; the UI uses this to persist reordering.
    pub async fn set_prompts(&self, prompts: Vec<Prompt>) -> Result<()> {
        self.mutate(|store, clock| {
            store.prompts = dedupe_uuids(
                prompts
                    .into_iter()
                    .map(|p| normalize_prompt(p, clock))
                    .collect(),
            );
            Ok(())
        })
        .await
    }

    /// [`set_prompts`](Self::set_prompts) for prompt-like JSON records
    ///
    /// Missing fields get the same defaults as records read from storage;
    /// non-object entries are dropped.
    pub async fn set_prompt_values(&self, raw: &[Value]) -> Result<()> {
        let prompts = normalize_prompt_list(raw, self.clock.as_ref()).value;
        self.set_prompts(prompts).await
    }

    /// Create a prompt
    ///
    /// Empty title or content is a validation error. Substrate failures do not
    /// error; they come back as `success: false` so the UI can show them.
    pub async fn save_prompt(&self, input: NewPrompt) -> Result<SaveOutcome> {
        if input.title.trim().is_empty() || input.content.trim().is_empty() {
            return Err(DockError::ValidationError(
                "Title and content are required".to_string(),
            ));
        }

        let result = self
            .mutate(|store, clock| {
                let mut uuid = input.uuid.clone().filter(|u| !u.trim().is_empty());
                if let Some(existing) = &uuid {
                    if store.prompts.iter().any(|p| &p.uuid == existing) {
                        warn!(uuid = %existing, "uuid already taken, generating a new one");
                        uuid = None;
                    }
                }
                let prompt = Prompt {
                    uuid:       uuid.unwrap_or_else(ids::generate),
                    title:      input.title.clone(),
                    content:    input.content.clone(),
                    tags:       normalize_tags(input.tags.clone().unwrap_or_default()),
                    folder_id:  model::normalize_folder_ref(input.folder_id.clone()),
                    created_at: clock.now_iso(),
                    updated_at: None,
                };
                store.prompts.push(prompt.clone());
                Ok(prompt)
            })
            .await;

        match result {
            Ok(prompt) => {
                info!(uuid = %prompt.uuid, "prompt saved");
                Ok(SaveOutcome {
                    success: true,
                    prompt:  Some(prompt),
                    error:   None,
                })
            },
            Err(err) => {
                warn!(error = %err, "failed to save prompt");
                Ok(SaveOutcome {
                    success: false,
                    prompt:  None,
                    error:   Some(err.user_message()),
                })
            },
        }
    }

    /// Apply a partial update and stamp `updatedAt`
    pub async fn update_prompt(&self, uuid: &str, patch: PromptPatch) -> Result<Prompt> {
        self.mutate(|store, clock| {
            let slot = store
                .prompts
                .iter_mut()
                .find(|p| p.uuid == uuid)
                .ok_or_else(|| DockError::PromptNotFound(uuid.to_string()))?;

            let mut next = slot.clone();
            if let Some(title) = patch.title {
                next.title = title;
            }
            if let Some(content) = patch.content {
                next.content = content;
            }
            if let Some(tags) = patch.tags {
                next.tags = tags;
            }
            if let Some(folder_id) = patch.folder_id {
                next.folder_id = folder_id;
            }
            next.updated_at = Some(clock.now_iso());

            *slot = normalize_prompt(next, clock);
            Ok(slot.clone())
        })
        .await
    }

    /// Remove a prompt; removing an unknown uuid succeeds
    pub async fn delete_prompt(&self, uuid: &str) -> Result<bool> {
        self.mutate(|store, _| {
            let before = store.prompts.len();
            store.prompts.retain(|p| p.uuid != uuid);
            if store.prompts.len() == before {
                debug!(uuid = %uuid, "delete of unknown prompt ignored");
            }
            Ok(true)
        })
        .await
    }

    /// Merge incoming prompts by uuid, newer timestamp wins
    pub async fn merge_prompts(&self, imported: Vec<Prompt>) -> Result<Vec<Prompt>> {
        self.mutate(|store, clock| {
            let incoming = imported.into_iter().map(|p| normalize_prompt(p, clock)).collect();
            merge_prompt_lists(&mut store.prompts, incoming);
            Ok(store.prompts.clone())
        })
        .await
    }

    /// [`merge_prompts`](Self::merge_prompts) for prompt-like JSON records
    pub async fn merge_prompt_values(&self, raw: &[Value]) -> Result<Vec<Prompt>> {
        let prompts = normalize_prompt_list(raw, self.clock.as_ref()).value;
        self.merge_prompts(prompts).await
    }

    /// Import from a file, JSON text, a prompt array or a store-shaped object
    ///
    /// Prompts are merged as in [`merge_prompts`](Self::merge_prompts);
    /// folders are merged by id with the incoming folder winning.
    pub async fn import_prompts(&self, source: ImportSource) -> Result<Vec<Prompt>> {
        let payload = transfer::read_import(source).await?;
        let prompts = normalize_prompt_list(&payload.prompts, self.clock.as_ref()).value;
        let folders = normalize_folder_list(&payload.folders, self.clock.as_ref()).value;
        let (prompt_count, folder_count) = (prompts.len(), folders.len());

        let merged = self
            .mutate(|store, _| {
                merge_prompt_lists(&mut store.prompts, prompts);
                merge_folder_lists(&mut store.folders, folders);
                Ok(store.prompts.clone())
            })
            .await?;
        info!(prompts = prompt_count, folders = folder_count, total = merged.len(), "import merged");
        Ok(merged)
    }

    /// Prompt list as a downloadable JSON file
    pub async fn export_prompts(&self) -> Result<ExportFile> {
        let store = self.load_store().await?;
        Ok(ExportFile {
            filename: transfer::export_filename(self.clock.now()),
            contents: transfer::to_pretty_json(&store.prompts)?,
        })
    }

    /// Whole store (prompts and folders) as a downloadable JSON file
    pub async fn export_store(&self) -> Result<ExportFile> {
        let store = self.load_store().await?;
        Ok(ExportFile {
            filename: transfer::backup_filename(self.clock.now()),
            contents: transfer::to_pretty_json(&store)?,
        })
    }

    /// Export the prompt list into `dir`
    pub async fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        let file = self.export_prompts().await?;
        let path = file.save_to(dir).await?;
        info!(path = %path.display(), "prompts exported");
        Ok(path)
    }

    /// Legacy CSV export (`Title,Content,Folder`)
    pub async fn export_csv(&self) -> Result<String> {
        let store = self.load_store().await?;
        Ok(transfer::prompts_to_csv(&store.prompts, &store.folders))
    }

    /// Legacy CSV import
    ///
    /// Folder names are matched against existing folders and created when
    /// missing. Rows become new prompts merged with
    /// [`merge_prompts`](Self::merge_prompts) semantics.
    pub async fn import_csv(&self, text: &str) -> Result<Vec<Prompt>> {
        let rows = transfer::parse_csv(text)?;
        self.mutate(|store, clock| {
            let now = clock.now_iso();
            let mut incoming = Vec::with_capacity(rows.len());
            for row in rows {
                if row.title.trim().is_empty() && row.content.trim().is_empty() {
                    continue;
                }
                let folder_id = row.folder.map(|name| folder_id_for_name(store, &name, &now));
                incoming.push(Prompt {
                    uuid: ids::generate(),
                    title: row.title,
                    content: row.content,
                    tags: Vec::new(),
                    folder_id,
                    created_at: now.clone(),
                    updated_at: None,
                });
            }
            merge_prompt_lists(&mut store.prompts, incoming);
            Ok(store.prompts.clone())
        })
        .await
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Prompts filed under `folder_id`; `None` selects unfiled prompts
    pub async fn prompts_in_folder(&self, folder_id: Option<&str>) -> Vec<Prompt> {
        self.get_prompts()
            .await
            .into_iter()
            .filter(|p| p.folder_id.as_deref() == folder_id)
            .collect()
    }

    /// Sorted, unique tags across all prompts
    pub async fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .get_prompts()
            .await
            .into_iter()
            .flat_map(|p| p.tags)
            .collect();
        tags.sort_by_key(|t| t.to_lowercase());
        tags.dedup_by(|a, b| a.to_lowercase() == b.to_lowercase());
        tags
    }

    /// Case-insensitive search over title, content and tags
    pub async fn search_prompts(&self, query: &str) -> Vec<Prompt> {
        let needle = query.trim().to_lowercase();
        let prompts = self.get_prompts().await;
        if needle.is_empty() {
            return prompts;
        }
        prompts
            .into_iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.content.to_lowercase().contains(&needle)
                    || p.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .collect()
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub async fn add_tag_to_prompt(&self, uuid: &str, tag: &str) -> Result<Prompt> {
        let prompt = self.require_prompt(uuid).await?;
        let mut tags = prompt.tags;
        tags.push(tag.to_string());
        self.set_tags_for_prompt(uuid, tags).await
    }

    pub async fn remove_tag_from_prompt(&self, uuid: &str, tag: &str) -> Result<Prompt> {
        let prompt = self.require_prompt(uuid).await?;
        let tag = tag.trim();
        let tags = prompt.tags.into_iter().filter(|t| t != tag).collect();
        self.set_tags_for_prompt(uuid, tags).await
    }

    pub async fn set_tags_for_prompt(&self, uuid: &str, tags: Vec<String>) -> Result<Prompt> {
        self.update_prompt(
            uuid,
            PromptPatch {
                tags: Some(tags),
                ..Default::default()
            },
        )
        .await
    }

    async fn require_prompt(&self, uuid: &str) -> Result<Prompt> {
        self.load_store()
            .await?
            .prompts
            .into_iter()
            .find(|p| p.uuid == uuid)
            .ok_or_else(|| DockError::PromptNotFound(uuid.to_string()))
    }

    // ========================================================================
    // Folders
    // ========================================================================

    /// All folders; empty on substrate failure
    pub async fn get_folders(&self) -> Vec<Folder> {
        match self.load_store().await {
            Ok(store) => store.folders,
            Err(err) => {
                warn!(error = %err, "failed to read folders, returning empty list");
                Vec::new()
            },
        }
    }

    /// Replace the whole folder list, keeping prompts
    pub async fn set_folders(&self, folders: Vec<Folder>) -> Result<()> {
        self.mutate(|store, clock| {
            store.folders = folders.into_iter().map(|f| normalize_folder(f, clock)).collect();
            Ok(())
        })
        .await
    }

    pub async fn save_folder(&self, input: NewFolder) -> Result<Folder> {
        if input.name.trim().is_empty() {
            return Err(DockError::ValidationError("Folder name is required".to_string()));
        }
        self.mutate(|store, clock| {
            let folder = Folder {
                id:         ids::generate(),
                name:       input.name.trim().to_string(),
                parent_id:  model::normalize_folder_ref(input.parent_id),
                created_at: clock.now_iso(),
                updated_at: None,
            };
            store.folders.push(folder.clone());
            Ok(folder)
        })
        .await
    }

    pub async fn update_folder(&self, id: &str, patch: FolderPatch) -> Result<Folder> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(DockError::ValidationError("Folder name is required".to_string()));
            }
        }
        self.mutate(|store, clock| {
            let slot = store
                .folders
                .iter_mut()
                .find(|f| f.id == id)
                .ok_or_else(|| DockError::FolderNotFound(id.to_string()))?;
            if let Some(name) = patch.name {
                slot.name = name.trim().to_string();
            }
            if let Some(parent_id) = patch.parent_id {
                slot.parent_id = model::normalize_folder_ref(parent_id);
            }
            slot.updated_at = Some(clock.now_iso());
            Ok(slot.clone())
        })
        .await
    }

    /// Remove a folder and detach everything that pointed at it
    ///
    /// Prompts in the folder become unfiled and child folders move to the
    /// top level. No prompt is ever deleted here.
    pub async fn delete_folder(&self, id: &str) -> Result<()> {
        self.mutate(|store, clock| {
            store.folders.retain(|f| f.id != id);
            let now = clock.now_iso();
            let mut detached = 0usize;
            for prompt in store.prompts.iter_mut().filter(|p| p.folder_id.as_deref() == Some(id)) {
                prompt.folder_id = None;
                prompt.updated_at = Some(now.clone());
                detached += 1;
            }
            for child in store.folders.iter_mut().filter(|f| f.parent_id.as_deref() == Some(id)) {
                child.parent_id = None;
                child.updated_at = Some(now.clone());
            }
            debug!(folder = %id, detached, "folder deleted");
            Ok(())
        })
        .await
    }

    /// Folder names from the root down to `id`
    ///
    /// Stops at a missing parent or when a parent cycle is detected.
    pub async fn folder_path(&self, id: &str) -> Vec<Folder> {
        let folders = self.get_folders().await;
        let by_id: HashMap<&str, &Folder> = folders.iter().map(|f| (f.id.as_str(), f)).collect();
        let mut chain: Vec<Folder> = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(folder) = by_id.get(current) else {
                break;
            };
            if chain.iter().any(|f| f.id == folder.id) {
                warn!(folder = %folder.id, "folder parent cycle detected");
                break;
            }
            chain.push((*folder).clone());
            cursor = folder.parent_id.as_deref();
        }
        chain.reverse();
        chain
    }

    // ========================================================================
    // Generic values and preferences
    // ========================================================================

    /// Read a value; missing keys, bad shapes and substrate errors yield `default`
    pub async fn get_value<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.kv.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(v) => v,
                Err(err) => {
                    warn!(key, error = %err, "stored value has unexpected shape, using default");
                    default
                },
            },
            Ok(None) => default,
            Err(err) => {
                warn!(key, error = %err, "failed to read value, using default");
                default
            },
        }
    }

    pub async fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.kv.set(key, serde_json::to_value(value)?).await
    }

    /// Raw JSON read with the documented default for preference keys
    pub async fn get_raw(&self, key: &str) -> Option<Value> {
        match self.kv.get(key).await {
            Ok(Some(value)) => Some(value),
            Ok(None) => preferences::default_for(key),
            Err(err) => {
                warn!(key, error = %err, "failed to read value");
                preferences::default_for(key)
            },
        }
    }

    /// Every preference with defaults filled in
    pub async fn preferences(&self) -> Preferences {
        use preferences::keys;
        let d = Preferences::default();
        Preferences {
            button_position:      self.get_value(keys::BUTTON_POSITION, d.button_position).await,
            keyboard_shortcut:    self.get_value(keys::KEYBOARD_SHORTCUT, d.keyboard_shortcut).await,
            disable_overwrite:    self.get_value(keys::DISABLE_OVERWRITE, d.disable_overwrite).await,
            display_mode:         self.get_value(keys::DISPLAY_MODE, d.display_mode).await,
            onboarding_completed: self.get_value(keys::ONBOARDING_COMPLETED, d.onboarding_completed).await,
            enable_tags:          self.get_value(keys::ENABLE_TAGS, d.enable_tags).await,
        }
    }

    // ========================================================================
    // Change notification
    // ========================================================================

    /// Call `callback` with the fresh prompt list whenever the stored prompts
    /// change, whoever wrote them
    ///
    /// The callback runs on a dedicated thread. It is not called again for a
    /// list identical to the one it last received, so the paired canonical and
    /// mirror writes produce one call.
    pub fn on_prompts_changed<F>(&self, callback: F) -> PromptWatch
    where
        F: Fn(Vec<Prompt>) + Send + 'static,
    {
        let subscription = self.kv.subscribe();
        let clock = Arc::clone(&self.clock);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let spawned = std::thread::Builder::new()
            .name("prompt-watch".to_string())
            .spawn(move || {
                let mut last: Option<Vec<Prompt>> = None;
                loop {
                    crossbeam_channel::select! {
                        recv(subscription.receiver()) -> msg => {
                            let Ok(change) = msg else { break };
                            let Some(prompts) = prompts_from_change(&change, clock.as_ref()) else {
                                continue;
                            };
                            if last.as_ref() != Some(&prompts) {
                                last = Some(prompts.clone());
                                callback(prompts);
                            }
                        },
                        recv(stop_rx) -> _ => break,
                    }
                }
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(error = %err, "could not start prompt watcher thread");
                None
            },
        };
        PromptWatch {
            stop: Some(stop_tx),
            handle,
        }
    }
}

/// Handle for an [`PromptStorage::on_prompts_changed`] listener
///
/// Dropping it stops the listener.
pub struct PromptWatch {
    stop:   Option<crossbeam_channel::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PromptWatch {
    /// Stop listening and wait for the listener thread to finish
    pub fn unsubscribe(mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PromptWatch {
    fn drop(&mut self) {
        // Disconnecting the stop channel ends the select loop
        self.stop.take();
    }
}

fn prompts_from_change(change: &StorageChange, clock: &dyn Clock) -> Option<Vec<Prompt>> {
    match change.key.as_str() {
        STORE_KEY => {
            let store = migrate(change.new_value.clone(), None, clock).store;
            Some(store.prompts)
        },
        LEGACY_PROMPTS_KEY => {
            let items = change
                .new_value
                .as_ref()
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            Some(normalize_prompt_list(&items, clock).value)
        },
        _ => None,
    }
}

/// Merge `incoming` into `existing` by uuid
///
/// A matching incoming record replaces the existing one only when its
/// `updatedAt` (or `createdAt`) is strictly later, keeping the existing
/// position. Unknown uuids are appended in incoming order.
pub fn merge_prompt_lists(existing: &mut Vec<Prompt>, incoming: Vec<Prompt>) {
    let mut index: HashMap<String, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, p)| (p.uuid.clone(), i))
        .collect();
    for prompt in incoming {
        match index.get(&prompt.uuid) {
            Some(&i) => {
                if prompt.is_newer_than(&existing[i]) {
                    existing[i] = prompt;
                }
            },
            None => {
                index.insert(prompt.uuid.clone(), existing.len());
                existing.push(prompt);
            },
        }
    }
}

/// Merge folders by id; incoming wins on collision
pub fn merge_folder_lists(existing: &mut Vec<Folder>, incoming: Vec<Folder>) {
    for folder in incoming {
        match existing.iter_mut().find(|f| f.id == folder.id) {
            Some(slot) => *slot = folder,
            None => existing.push(folder),
        }
    }
}

/// Keep the first occurrence of every uuid
fn dedupe_uuids(prompts: Vec<Prompt>) -> Vec<Prompt> {
    let mut seen = std::collections::HashSet::new();
    prompts
        .into_iter()
        .filter(|p| {
            let fresh = seen.insert(p.uuid.clone());
            if !fresh {
                warn!(uuid = %p.uuid, "dropping duplicate prompt uuid");
            }
            fresh
        })
        .collect()
}

/// Find a folder by exact name, creating it when missing
fn folder_id_for_name(store: &mut Store, name: &str, now: &str) -> String {
    if let Some(folder) = store.folders.iter().find(|f| f.name == name) {
        return folder.id.clone();
    }
    let folder = Folder {
        id:         ids::generate(),
        name:       name.to_string(),
        parent_id:  None,
        created_at: now.to_string(),
        updated_at: None,
    };
    let id = folder.id.clone();
    store.folders.push(folder);
    id
}
