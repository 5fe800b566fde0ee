//! History Store Integration Tests
//!
//! History collections persisted through the file-backed key-value store.

use std::sync::Arc;

use writedeck::models::execution::{ExecutionUpdate, NewExecution};
use writedeck::services::history::{HistoryStore, ManualClock};
use writedeck::storage::FileStore;
use writedeck_core::KeyValueStore;
use writedeck_tools::{FieldValue, FormInputs};

fn inputs(topic: &str) -> FormInputs {
    let mut inputs = FormInputs::new();
    inputs.insert("topic".to_string(), FieldValue::text(topic));
    inputs
}

fn file_history(dir: &std::path::Path, tool: &str) -> HistoryStore {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir).unwrap());
    HistoryStore::for_tool(store, tool)
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_history_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let record = file_history(dir.path(), "quiz-generator")
        .append(NewExecution::new("photosynthesis", inputs("photosynthesis"), "..."))
        .unwrap();

    let reopened = file_history(dir.path(), "quiz-generator");
    assert_eq!(reopened.list().unwrap(), vec![record]);
    assert!(file_history(dir.path(), "other-tool").list().unwrap().is_empty());
}

#[test]
fn test_append_then_list_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let history = file_history(dir.path(), "quiz-generator");

    let mut outputs = std::collections::BTreeMap::new();
    outputs.insert("answers".to_string(), "1. B".to_string());
    let new = NewExecution::new("water cycle", inputs("water cycle"), "Q1. What...")
        .with_model(Some("gpt-4o".to_string()))
        .with_outputs(outputs);
    history.append(new.clone()).unwrap();

    let listed = file_history(dir.path(), "quiz-generator").list().unwrap();
    assert_eq!(listed.len(), 1);
    let record = &listed[0];
    assert_eq!(record.title, new.title);
    assert_eq!(record.inputs, new.inputs);
    assert_eq!(record.output, new.output);
    assert_eq!(record.outputs, new.outputs);
    assert_eq!(record.model, new.model);
}

#[test]
fn test_stored_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let history = HistoryStore::for_tool(store.clone(), "quiz-generator")
        .with_clock(Arc::new(ManualClock::new(42)));
    let record = history
        .append(NewExecution::new("t", inputs("t"), "out"))
        .unwrap();

    let raw = store.get("history:quiz-generator").unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": record.id,
            "title": "t",
            "timestamp": 42,
            "inputs": {"topic": "t"},
            "output": "out",
        }])
    );
}

// ============================================================================
// Ordering and edits
// ============================================================================

#[test]
fn test_n_appends_list_n_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));
    let history = file_history(dir.path(), "quiz-generator").with_clock(clock.clone());

    for i in 0..5 {
        history
            .append(NewExecution::new(format!("run {}", i), inputs("x"), ""))
            .unwrap();
        clock.advance(1_000);
    }

    let listed = history.list().unwrap();
    assert_eq!(listed.len(), 5);
    assert!(listed.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
    assert_eq!(listed[0].title, "run 4");
}

#[test]
fn test_rename_changes_only_title_and_delete_keeps_others() {
    let dir = tempfile::tempdir().unwrap();
    let history = file_history(dir.path(), "quiz-generator");
    let a = history.append(NewExecution::new("a", inputs("a"), "out a")).unwrap();
    let b = history.append(NewExecution::new("b", inputs("b"), "out b")).unwrap();

    let renamed = history.rename(&a.id, "A renamed").unwrap().unwrap();
    assert_eq!(
        renamed,
        writedeck::ToolExecution {
            title: "A renamed".to_string(),
            ..a.clone()
        }
    );

    let updated = history
        .update(
            &b.id,
            ExecutionUpdate {
                output: Some("out b v2".to_string()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.output, "out b v2");
    assert_eq!(updated.title, "b");

    assert!(history.remove(&a.id).unwrap());
    let remaining = history.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);
}
