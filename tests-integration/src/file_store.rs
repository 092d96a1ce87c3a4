//! Storage backed by a real JSON file

use std::sync::Arc;

use promptdock_core as promptdock;
use promptdock::config::StorageConfig;
use promptdock::kv::{JsonFileStore, KeyValueStore};
use promptdock::store::NewPrompt;
use promptdock::{open_storage, PromptStorage};
use serde_json::{json, Value};

fn config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        data_dir:   dir.path().to_path_buf(),
        store_file: "store.json".to_string(),
    }
}

#[tokio::test]
async fn test_prompts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = config(&dir).store_path();

    {
        let storage = PromptStorage::with_system_clock(Arc::new(JsonFileStore::open(&path).unwrap()));
        let outcome = storage
            .save_prompt(NewPrompt {
                title: "Greeting".into(),
                content: "Hi #name#!".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(outcome.success);
    }

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["promptStore"]["version"], json!(2));
    assert_eq!(on_disk["prompts"][0]["title"], json!("Greeting"));

    let reopened = PromptStorage::with_system_clock(Arc::new(JsonFileStore::open(&path).unwrap()));
    let prompts = reopened.get_prompts().await;
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].content, "Hi #name#!");
}

#[tokio::test]
async fn test_legacy_file_is_migrated_on_first_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = config(&dir).store_path();
    std::fs::write(
        &path,
        json!({
            "prompts": [
                {"uuid": "p1", "title": "Old", "content": "legacy body", "createdAt": "2023-01-01T00:00:00.000Z"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    let kv = Arc::new(JsonFileStore::open(&path).unwrap());
    let storage = PromptStorage::with_system_clock(kv.clone());
    let store = storage.load_store().await.unwrap();

    assert_eq!(store.version, 2);
    assert_eq!(store.prompts[0].uuid, "p1");
    assert!(store.folders.is_empty());
    let canonical = kv.get("promptStore").await.unwrap().unwrap();
    assert_eq!(canonical["prompts"][0]["title"], json!("Old"));
}

#[test]
fn test_open_storage_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let storage = open_storage(&config(&dir)).unwrap();
    let ctx = promptdock::commands::CommandContext::new(storage);

    let saved = promptdock::commands::call(&ctx, "prompts.save", json!({"title": "t", "content": "c"}));
    assert_eq!(saved["success"], json!(true));
    assert!(dir.path().join("store.json").is_file());
}
