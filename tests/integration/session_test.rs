//! Tool Session Integration Tests
//!
//! The submit cycle driven by a scripted backend whose chunks are fed by
//! the test, so every step of a stream can be observed.

use std::sync::Arc;

use bytes::Bytes;
use writedeck::services::history::HistoryStore;
use writedeck::services::session::{SessionView, SubmissionState, SubmitOutcome, ToolSession};
use writedeck::services::sidebar::HistorySidebar;
use writedeck::storage::ApiKeyStore;
use writedeck::{NewExecution, ToolExecution};
use writedeck_core::{KeyValueStore, MemoryStore};
use writedeck_llm::{LlmError, ScriptedBackend, ScriptedResponse, StreamConsumer};
use writedeck_tools::{FieldValue, FormInputs, ToolCatalog};

struct Harness {
    store: Arc<dyn KeyValueStore>,
    backend: Arc<ScriptedBackend>,
}

impl Harness {
    fn new() -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        ApiKeyStore::new(store.clone()).set("sk-integration").unwrap();
        Self {
            store,
            backend: Arc::new(ScriptedBackend::new()),
        }
    }

    fn session(&self, tool_id: &str) -> ToolSession {
        let tool = ToolCatalog::builtin().get(tool_id).unwrap().clone();
        ToolSession::open(
            tool,
            HistoryStore::for_tool(self.store.clone(), tool_id),
            ApiKeyStore::new(self.store.clone()),
            StreamConsumer::new(self.backend.clone()),
        )
        .unwrap()
    }
}

#[tokio::test]
async fn test_chunks_publish_progressively_and_final_output_is_recorded() {
    let harness = Harness::new();
    let tx = harness.backend.push_channel();
    let session = harness.session("quiz-generator");
    session
        .set_field("topic", FieldValue::text("photosynthesis"))
        .unwrap();
    let mut rx = session.subscribe();

    let driver = async {
        for (chunk, expected) in [
            ("Hel", "Hel"),
            ("lo, ", "Hello, "),
            ("world", "Hello, world"),
        ] {
            tx.send(Ok(Bytes::from(chunk))).unwrap();
            let view = rx.wait_for(|v| v.output == expected).await.unwrap().clone();
            assert_eq!(view.state, SubmissionState::Streaming);
        }
        drop(tx);
    };
    let (outcome, _) = tokio::join!(session.submit(), driver);

    let SubmitOutcome::Completed(record) = outcome.unwrap() else {
        panic!("run did not complete");
    };
    assert_eq!(record.output, "Hello, world");
    let history = HistoryStore::for_tool(harness.store.clone(), "quiz-generator");
    assert_eq!(history.list().unwrap(), vec![record.clone()]);
    assert_eq!(
        session.view(),
        SessionView {
            state: SubmissionState::Idle,
            output: "Hello, world".to_string(),
            active_id: Some(record.id),
        }
    );
}

#[tokio::test]
async fn test_second_submission_supersedes_first() {
    let harness = Harness::new();
    let first_tx = harness.backend.push_channel();
    let second_tx = harness.backend.push_channel();
    let session = harness.session("text-summarizer");
    session
        .set_field("text", FieldValue::text("A long passage"))
        .unwrap();
    let mut rx = session.subscribe();

    let driver = async {
        first_tx.send(Ok(Bytes::from("first "))).unwrap();
        rx.wait_for(|v| v.output == "first ").await.unwrap();

        let feed = async {
            // The first stream may already be gone; a late chunk is
            // either dropped by the closed channel or discarded as stale.
            let _ = first_tx.send(Ok(Bytes::from("LATE")));
            second_tx.send(Ok(Bytes::from("second"))).unwrap();
            drop(second_tx);
        };
        let (outcome, _) = tokio::join!(session.submit(), feed);
        outcome
    };
    let (first, second) = tokio::join!(session.submit(), driver);

    assert!(matches!(first.unwrap(), SubmitOutcome::Cancelled));
    let SubmitOutcome::Completed(record) = second.unwrap() else {
        panic!("second run did not complete");
    };
    assert_eq!(record.output, "second");
    assert_eq!(session.view().output, "second");
    assert_eq!(harness.backend.request_count(), 2);

    let history = HistoryStore::for_tool(harness.store.clone(), "text-summarizer");
    assert_eq!(history.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failure_after_partial_output_shows_fixed_message() {
    let harness = Harness::new();
    harness.backend.push(ScriptedResponse::FailAfter {
        chunks: vec![Bytes::from("partial")],
        message: "connection reset".to_string(),
    });
    let session = harness.session("email-writer");
    session
        .set_field("key_points", FieldValue::text("ship it"))
        .unwrap();

    let outcome = session.submit().await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Failed(LlmError::Network { .. })));
    let view = session.view();
    assert_eq!(view.state, SubmissionState::Error);
    assert_eq!(view.output, writedeck_llm::GENERATION_FAILED_MESSAGE);
    assert!(HistoryStore::for_tool(harness.store.clone(), "email-writer")
        .list()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_clear_during_stream_discards_late_output() {
    let harness = Harness::new();
    let tx = harness.backend.push_channel();
    let session = harness.session("quiz-generator");
    session.set_field("topic", FieldValue::text("x")).unwrap();
    let mut rx = session.subscribe();

    let driver = async {
        tx.send(Ok(Bytes::from("abc"))).unwrap();
        rx.wait_for(|v| v.output == "abc").await.unwrap();
        session.clear();
        let _ = tx.send(Ok(Bytes::from("def")));
    };
    let (outcome, _) = tokio::join!(session.submit(), driver);

    assert!(matches!(outcome.unwrap(), SubmitOutcome::Cancelled));
    assert_eq!(session.view(), SessionView::default());
}

#[tokio::test]
async fn test_storage_quota_error_keeps_output_visible() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_quota(200));
    ApiKeyStore::new(store.clone()).set("sk-integration").unwrap();
    let backend = Arc::new(ScriptedBackend::new());
    backend.push(ScriptedResponse::chunks(["x".repeat(400)]));

    let tool = ToolCatalog::builtin().get("quiz-generator").unwrap().clone();
    let session = ToolSession::open(
        tool,
        HistoryStore::for_tool(store.clone(), "quiz-generator"),
        ApiKeyStore::new(store.clone()),
        StreamConsumer::new(backend),
    )
    .unwrap();
    session.set_field("topic", FieldValue::text("x")).unwrap();

    let err = session.submit().await.unwrap_err();
    assert!(err.is_storage());
    let view = session.view();
    assert_eq!(view.output, "x".repeat(400));
    assert_eq!(view.active_id, None);
    assert_eq!(view.state, SubmissionState::Idle);
}

/// Two quiz runs; the older one carries an input the tool no longer defines.
fn seed_two_runs(harness: &Harness) -> (ToolExecution, ToolExecution) {
    let history = HistoryStore::for_tool(harness.store.clone(), "quiz-generator");
    let mut older_inputs = FormInputs::new();
    older_inputs.insert("topic".into(), FieldValue::text("volcanoes"));
    older_inputs.insert("difficulty".into(), FieldValue::text("hard"));
    let older = history
        .append(NewExecution::new("Volcanoes", older_inputs, "Q1. What is magma?"))
        .unwrap();
    let mut newer_inputs = FormInputs::new();
    newer_inputs.insert("topic".into(), FieldValue::text("tides"));
    let newer = history
        .append(NewExecution::new("Tides", newer_inputs, "Q1. What causes tides?"))
        .unwrap();
    (older, newer)
}

fn expected_inputs(topic: &str) -> FormInputs {
    let tool = ToolCatalog::builtin().get("quiz-generator").unwrap().clone();
    let mut inputs = tool.blank_inputs();
    inputs.insert("topic".into(), FieldValue::text(topic));
    inputs
}

#[tokio::test]
async fn test_sidebar_selection_restores_older_run() {
    let harness = Harness::new();
    let (older, newer) = seed_two_runs(&harness);
    let session = harness.session("quiz-generator");
    assert_eq!(session.view().active_id, Some(newer.id.clone()));

    let sidebar =
        HistorySidebar::new(HistoryStore::for_tool(harness.store.clone(), "quiz-generator"))
            .unwrap();
    assert!(sidebar.select(&older.id, |record| session.restore(record)));

    let inputs = session.inputs();
    assert_eq!(inputs, expected_inputs("volcanoes"));
    assert!(!inputs.contains_key("difficulty"));
    assert_eq!(
        session.view(),
        SessionView {
            state: SubmissionState::Idle,
            output: "Q1. What is magma?".to_string(),
            active_id: Some(older.id.clone()),
        }
    );

    assert!(!sidebar.select("missing", |record| session.restore(record)));
    assert_eq!(session.view().active_id, Some(older.id));
}

#[tokio::test]
async fn test_selection_during_stream_discards_late_output() {
    let harness = Harness::new();
    let (older, _newer) = seed_two_runs(&harness);
    let tx = harness.backend.push_channel();
    let session = harness.session("quiz-generator");
    session.set_field("topic", FieldValue::text("comets")).unwrap();
    let sidebar =
        HistorySidebar::new(HistoryStore::for_tool(harness.store.clone(), "quiz-generator"))
            .unwrap();
    let mut rx = session.subscribe();

    let driver = async {
        tx.send(Ok(Bytes::from("abc"))).unwrap();
        rx.wait_for(|v| v.output == "abc").await.unwrap();
        assert!(sidebar.select(&older.id, |record| session.restore(record)));
        let _ = tx.send(Ok(Bytes::from("def")));
    };
    let (outcome, _) = tokio::join!(session.submit(), driver);

    assert!(matches!(outcome.unwrap(), SubmitOutcome::Cancelled));
    assert_eq!(session.inputs(), expected_inputs("volcanoes"));
    assert_eq!(session.view().output, "Q1. What is magma?");
    assert_eq!(session.view().active_id, Some(older.id));
    // The interrupted run was not recorded
    let history = HistoryStore::for_tool(harness.store.clone(), "quiz-generator");
    assert_eq!(history.list().unwrap().len(), 2);
}
