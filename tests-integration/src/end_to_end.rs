//! Widget flow over a headless page: save, select, fill values, insert

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use promptdock_core as promptdock;
use promptdock::adapter::headless::{HeadlessElement, HeadlessPage, RecordingPanel};
use promptdock::adapter::{HostElement, InputAdapter, InsertOutcome, SiteTable, WaitTiming};
use promptdock::kv::MemoryStore;
use promptdock::mediator::{Mediator, SelectOutcome, SelectionState};
use promptdock::store::NewPrompt;
use promptdock::PromptStorage;

fn storage() -> Arc<PromptStorage> {
    Arc::new(PromptStorage::with_system_clock(Arc::new(MemoryStore::new())))
}

fn mediator(storage: &Arc<PromptStorage>, page: &Arc<HeadlessPage>, panel: &Arc<RecordingPanel>) -> Mediator {
    let adapter = InputAdapter::new(page.clone(), SiteTable::bundled().unwrap(), storage.clone()).with_timing(
        WaitTiming {
            timeout: Duration::from_millis(500),
            poll:    Duration::from_millis(25),
        },
    );
    Mediator::new(storage.clone(), adapter, panel.clone())
}

async fn save(storage: &PromptStorage, title: &str, content: &str) -> String {
    storage
        .save_prompt(NewPrompt {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .prompt
        .unwrap()
        .uuid
}

// ============================================================================
// Textarea sites
// ============================================================================

#[tokio::test]
async fn test_greeting_into_chatgpt_textarea() {
    let storage = storage();
    let page = Arc::new(HeadlessPage::new("https://chatgpt.com/c/123").unwrap());
    let panel = Arc::new(RecordingPanel::default());
    let ta = page.mount(HeadlessElement::textarea().id("prompt-textarea").build());
    let mediator = mediator(&storage, &page, &panel);

    let uuid = save(&storage, "Greeting", "Hi #name#!").await;
    match mediator.select(&uuid).await.unwrap() {
        SelectOutcome::NeedsValues(vars) => assert_eq!(vars, vec!["name".to_string()]),
        other => panic!("Expected NeedsValues, got {:?}", other),
    }

    let values = HashMap::from([("name".to_string(), "Ada".to_string())]);
    let outcome = mediator.submit(values).await.unwrap();

    assert!(outcome.is_inserted());
    assert_eq!(ta.value(), "Hi Ada!  ");
    assert!(ta.event_names().contains(&"input"));
    assert!(ta.event_names().contains(&"change"));
    assert_eq!(panel.hide_count(), 1);
    assert_eq!(mediator.state(), SelectionState::Idle);
}

#[tokio::test]
async fn test_input_box_appears_late() {
    let storage = storage();
    let page = Arc::new(HeadlessPage::new("https://chatgpt.com/").unwrap());
    let panel = Arc::new(RecordingPanel::default());
    let mediator = mediator(&storage, &page, &panel);
    let uuid = save(&storage, "Plain", "Summarize this").await;

    let mounter = {
        let page = page.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            page.mount(HeadlessElement::textarea().id("prompt-textarea").build())
        })
    };

    let outcome = mediator.select(&uuid).await.unwrap();
    let ta = mounter.await.unwrap();
    assert!(matches!(outcome, SelectOutcome::Inserted(InsertOutcome::Inserted { .. })));
    assert_eq!(ta.value(), "Summarize this  ");
}

// ============================================================================
// contentEditable sites
// ============================================================================

#[tokio::test]
async fn test_multiline_prompt_into_claude_editor() {
    let storage = storage();
    let page = Arc::new(HeadlessPage::new("https://claude.ai/new").unwrap());
    let panel = Arc::new(RecordingPanel::default());
    let editor = page.mount(
        HeadlessElement::editable("div")
            .class("ProseMirror")
            .attr("contenteditable", "true")
            .build(),
    );
    let mediator = mediator(&storage, &page, &panel);

    let uuid = save(&storage, "Review", "Review:\n#topic#").await;
    mediator.select(&uuid).await.unwrap();
    let values = HashMap::from([("topic".to_string(), "parser".to_string())]);
    mediator.submit(values).await.unwrap();

    let text = editor.inner_text();
    assert!(text.contains("Review:"));
    assert!(text.contains("parser"));
    assert!(editor.caret_at_end());
    assert!(editor.event_names().contains(&"input"));
}

#[tokio::test]
async fn test_navigation_to_unsupported_site() {
    let storage = storage();
    let page = Arc::new(HeadlessPage::new("https://chatgpt.com/").unwrap());
    let panel = Arc::new(RecordingPanel::default());
    page.mount(HeadlessElement::textarea().id("prompt-textarea").build());
    let mediator = mediator(&storage, &page, &panel);
    assert!(mediator.adapter().get_input_box().is_some());

    page.navigate("https://example.org/").unwrap();
    assert!(mediator.adapter().get_input_box().is_none());

    let uuid = save(&storage, "Plain", "text").await;
    assert!(mediator.select(&uuid).await.is_err());
    assert_eq!(panel.hide_count(), 0);
}
