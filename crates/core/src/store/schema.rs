//! Persisted layout and schema migration
//!
//! Layout in the key/value substrate:
//!
//! ```text
//! promptStore -> { "version": 2, "prompts": [...], "folders": [...] }
//! prompts     -> [...]   legacy mirror of promptStore.prompts
//! ```
//!
//! Version 1 was the bare `prompts` array. Version 2 wrapped it and added
//! folders, `folderId` and `updatedAt`.

use serde_json::Value;
use tracing::info;

use super::model::{normalize_folder_list, normalize_prompt_list, Store};
use crate::clock::Clock;

/// Canonical key holding the whole [`Store`]
pub const STORE_KEY: &str = "promptStore";

/// Legacy key holding only the prompt array
pub const LEGACY_PROMPTS_KEY: &str = "prompts";

/// Schema version written by this crate
pub const CURRENT_VERSION: u32 = 2;

/// Outcome of loading raw substrate contents
#[derive(Debug)]
pub(crate) struct Migration {
    pub store:   Store,
    /// The store must be written back before it is used
    pub persist: bool,
    pub source:  MigrationSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MigrationSource {
    /// Canonical key at the current version
    Current,
    /// Canonical key at an older (or unknown) version
    Upgraded { from: Option<u64> },
    /// Only the legacy bare array existed
    Legacy,
    /// Nothing stored yet
    Empty,
}

/// Turn whatever is stored under the two keys into a current [`Store`]
pub(crate) fn migrate(canonical: Option<Value>, legacy: Option<Value>, clock: &dyn Clock) -> Migration {
    match canonical {
        Some(Value::Object(obj)) => {
            let version = obj.get("version").and_then(Value::as_u64);
            let prompts = obj
                .get("prompts")
                .and_then(Value::as_array)
                .map(|items| normalize_prompt_list(items, clock));
            let folders = obj
                .get("folders")
                .and_then(Value::as_array)
                .map(|items| normalize_folder_list(items, clock));

            let repaired = prompts.as_ref().map(|p| p.repaired).unwrap_or(false)
                || folders.as_ref().map(|f| f.repaired).unwrap_or(false);
            let store = Store {
                version: CURRENT_VERSION,
                prompts: prompts.map(|p| p.value).unwrap_or_default(),
                folders: folders.map(|f| f.value).unwrap_or_default(),
            };

            if version == Some(u64::from(CURRENT_VERSION)) {
                Migration {
                    store,
                    persist: repaired,
                    source: MigrationSource::Current,
                }
            } else {
                info!(from = ?version, to = CURRENT_VERSION, "upgrading prompt store schema");
                Migration {
                    store,
                    persist: true,
                    source: MigrationSource::Upgraded { from: version },
                }
            }
        },
        // Some early builds wrote the bare array under the canonical key too
        Some(Value::Array(items)) => from_legacy(&items, clock),
        _ => match legacy {
            Some(Value::Array(items)) => from_legacy(&items, clock),
            _ => Migration {
                store:   Store::default(),
                persist: false,
                source:  MigrationSource::Empty,
            },
        },
    }
}

fn from_legacy(items: &[Value], clock: &dyn Clock) -> Migration {
    let prompts = normalize_prompt_list(items, clock).value;
    info!(count = prompts.len(), "migrating legacy prompt array to store v{}", CURRENT_VERSION);
    Migration {
        store:   Store {
            version: CURRENT_VERSION,
            prompts,
            folders: Vec::new(),
        },
        persist: true,
        source:  MigrationSource::Legacy,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::at("2024-05-01T12:00:00Z")
    }

    #[test]
    fn test_nothing_stored() {
        let m = migrate(None, None, &clock());
        assert_eq!(m.source, MigrationSource::Empty);
        assert!(!m.persist);
        assert_eq!(m.store, Store::default());
    }

    #[test]
    fn test_legacy_array_is_wrapped() {
        let m = migrate(None, Some(json!([{"title": "t", "content": "c"}])), &clock());
        assert_eq!(m.source, MigrationSource::Legacy);
        assert!(m.persist);
        assert_eq!(m.store.version, 2);
        assert_eq!(m.store.prompts.len(), 1);
        assert!(m.store.folders.is_empty());
    }

    #[test]
    fn test_current_store_is_not_rewritten() {
        let raw = json!({
            "version": 2,
            "prompts": [{"uuid": "a", "title": "t", "content": "c", "tags": [], "folderId": null, "createdAt": "2024-01-01"}],
            "folders": []
        });
        let m = migrate(Some(raw), Some(json!([])), &clock());
        assert_eq!(m.source, MigrationSource::Current);
        assert!(!m.persist);
        assert_eq!(m.store.prompts[0].uuid, "a");
    }

    #[test]
    fn test_current_store_with_missing_ids_is_repaired() {
        let raw = json!({"version": 2, "prompts": [{"title": "t"}], "folders": []});
        let m = migrate(Some(raw), None, &clock());
        assert!(m.persist, "generated uuids must be persisted to stay stable");
    }

    #[test]
    fn test_old_version_is_upgraded() {
        let raw = json!({"version": 1, "prompts": [{"uuid": "a", "title": "t", "content": "c", "createdAt": "x"}]});
        let m = migrate(Some(raw), None, &clock());
        assert_eq!(m.source, MigrationSource::Upgraded { from: Some(1) });
        assert!(m.persist);
        assert_eq!(m.store.version, CURRENT_VERSION);
        assert!(m.store.folders.is_empty());
        assert_eq!(m.store.prompts[0].folder_id, None);
    }

    #[test]
    fn test_canonical_wins_over_legacy() {
        let raw = json!({"version": 2, "prompts": [], "folders": []});
        let m = migrate(Some(raw), Some(json!([{"title": "stale"}])), &clock());
        assert!(m.store.prompts.is_empty());
    }

    #[test]
    fn test_bare_array_under_canonical_key() {
        let m = migrate(Some(json!([{"title": "t"}])), None, &clock());
        assert_eq!(m.source, MigrationSource::Legacy);
        assert_eq!(m.store.prompts.len(), 1);
    }
}
