//! Integration tests for command dispatch and handlers

use std::sync::Arc;

use promptdock_core as promptdock;
use promptdock::commands::{self, CommandContext};
use promptdock::kv::MemoryStore;
use promptdock::PromptStorage;
use serde_json::json;

fn context() -> CommandContext {
    CommandContext::new(Arc::new(PromptStorage::with_system_clock(Arc::new(MemoryStore::new()))))
}

#[test]
fn test_ping_command() {
    let ctx = context();
    let result = commands::dispatch(&ctx, "ping", json!({"message": "hello"})).unwrap();

    assert_eq!(result["pong"], json!(true));
    assert_eq!(result["message"], json!("hello"));
}

#[test]
fn test_command_not_found() {
    let ctx = context();
    assert!(commands::dispatch(&ctx, "nonexistent_command", json!({})).is_err());

    let obj = commands::call(&ctx, "nonexistent_command", json!({}));
    assert_eq!(obj["error"], json!(true));
    assert_eq!(obj["category"], json!("command"));
}

#[test]
fn test_list_commands() {
    let commands = commands::list_commands();

    assert!(commands.contains(&"ping".to_string()));
    assert!(commands.contains(&"prompts.save".to_string()));
    assert!(commands.contains(&"variables.extract".to_string()));
}

#[test]
fn test_widget_session() {
    let ctx = context();

    let saved = commands::call(&ctx, "prompts.save", json!({"title": "Greeting", "content": "Hi #name#!"}));
    assert_eq!(saved["success"], json!(true));
    let uuid = saved["prompt"]["uuid"].clone();

    let listed = commands::call(&ctx, "prompts.list", json!({}));
    assert_eq!(listed["prompts"].as_array().unwrap().len(), 1);

    let vars = commands::call(&ctx, "variables.extract", json!({"content": saved["prompt"]["content"]}));
    assert_eq!(vars["variables"], json!(["name"]));

    let text = commands::call(
        &ctx,
        "variables.replace",
        json!({"content": saved["prompt"]["content"], "values": {"name": "Ada"}}),
    );
    assert_eq!(text["content"], json!("Hi Ada!"));

    commands::call(&ctx, "tags.add", json!({"uuid": uuid, "tag": "greeting"}));
    assert_eq!(commands::call(&ctx, "tags.list", json!({}))["tags"], json!(["greeting"]));

    let exported = commands::call(&ctx, "prompts.export", json!({}));
    let fresh = context();
    let imported = commands::call(&fresh, "prompts.import", json!({"text": exported["contents"]}));
    assert_eq!(imported["count"], json!(1));
    assert_eq!(imported["prompts"][0]["uuid"], uuid);
}
