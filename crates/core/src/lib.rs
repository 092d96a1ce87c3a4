//! promptdock-core: prompt library and chat-input insertion engine
//!
//! The core behind the floating prompt manager widget:
//! - Versioned prompt/folder storage with legacy migration and merge-on-import
//! - `#name#` variable extraction and substitution
//! - Per-site input detection and framework-friendly text insertion
//! - A mediator tying selection, variable collection and insertion together
//! - A JSON command surface for the widget UI
//!
//! ## Architecture
//!
//! - **Storage**: `store::PromptStorage` over a pluggable `kv::KeyValueStore`
//!   (in-memory or a watched JSON file)
//! - **Host page**: `adapter::HostPage`/`HostElement` traits; a headless
//!   implementation ships for tests and scripting
//! - **UI glue**: `commands` registry plus `mediator::Mediator`

// Module declarations
pub mod adapter;
pub mod clock;
pub mod commands;
pub mod config;
pub mod errors;
pub mod ids;
pub mod kv;
pub mod logging;
pub mod mediator;
pub mod runtime;
pub mod store;
pub mod variables;

use std::sync::Arc;

pub use config::Config;
pub use errors::{DockError, Result};
pub use store::PromptStorage;

/// Open the file-backed store described by `config` and start watching it
///
/// A watcher that cannot start (no inotify, sandboxed FS) is logged and the
/// store keeps working without cross-process notifications.
pub fn open_storage(config: &config::StorageConfig) -> Result<Arc<PromptStorage>> {
    let kv = kv::JsonFileStore::open(config.store_path())?;
    if let Err(err) = kv.watch() {
        tracing::warn!(error = %err, "store watcher unavailable");
    }
    tracing::info!(path = %kv.path().display(), "prompt store opened");
    Ok(Arc::new(PromptStorage::with_system_clock(Arc::new(kv))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modules_exist() {
        // Ensure modules compile and are accessible
        let _error: errors::DockError = "test".into();
        assert!(!commands::list_commands().is_empty());
    }

    #[test]
    fn test_open_storage_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config::StorageConfig {
            data_dir:   dir.path().join("nested"),
            store_file: "store.json".to_string(),
        };
        let storage = open_storage(&config).unwrap();
        assert!(dir.path().join("nested").is_dir());
        assert!(runtime::block_on(storage.get_prompts()).is_empty());
    }
}
