//! CLI Command Integration Tests
//!
//! Command handlers run against a temporary data directory and a mock
//! generation endpoint.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use writedeck::commands::config::{ConfigArgs, ConfigCommand};
use writedeck::commands::history::{HistoryArgs, HistoryCommand};
use writedeck::commands::key::{KeyArgs, KeyCommand};
use writedeck::commands::run::RunArgs;
use writedeck::commands::tools::{ToolsArgs, ToolsCommand};
use writedeck::commands::{config, history, key, run, tools};
use writedeck::services::history::history_key;
use writedeck::services::MemoryClipboard;
use writedeck::{AppError, AppState};
use writedeck_core::{KeyValueStore, StreamEvent};
use writedeck_llm::{LlmError, ScriptedBackend, StreamConsumer};

fn output_of(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

fn state_with_server(dir: &std::path::Path, server: &MockServer) -> AppState {
    let mut state = AppState::initialize(dir).unwrap();
    let mut out: Vec<u8> = Vec::new();
    config::execute(
        &mut state,
        &ConfigArgs {
            command: ConfigCommand::Set {
                key: "base_url".to_string(),
                value: server.uri(),
            },
        },
        &mut out,
    )
    .unwrap();
    key::execute(
        &state,
        &KeyArgs {
            command: KeyCommand::Set {
                key: "sk-cli-test-key".to_string(),
            },
        },
        &mut out,
    )
    .unwrap();
    state
}

fn run_args(fields: &[&str]) -> RunArgs {
    RunArgs {
        tool: "quiz-generator".to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
        model: None,
        copy: false,
        json: false,
    }
}

async fn mount_quiz(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/quiz-generator"))
        .and(header("x-api-key", "sk-cli-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_interrupt_stops_without_recording() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::initialize(dir.path()).unwrap();
    state.api_keys().set("sk-cli-test-key").unwrap();
    let backend = Arc::new(ScriptedBackend::new());
    let tx = backend.push_channel();

    // Ctrl-C arrives while the stream is still open
    let interrupt = async {
        tx.send(Ok(Bytes::from("Partial "))).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
    };
    let mut out: Vec<u8> = Vec::new();
    let mut clipboard = MemoryClipboard::default();
    let mut args = run_args(&["topic=Photosynthesis"]);
    args.copy = true;
    let result = run::execute(
        &state,
        &args,
        StreamConsumer::new(backend.clone()),
        &mut clipboard,
        interrupt,
        &mut out,
    )
    .await
    .unwrap();

    assert!(result.is_none());
    assert_eq!(output_of(out), "Partial \n");
    assert!(clipboard.copies.is_empty());
    assert_eq!(backend.request_count(), 1);
    assert!(state.history("quiz-generator").unwrap().list().unwrap().is_empty());
    drop(tx);
}

#[test]
fn test_purge_recovers_from_corrupt_history() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::initialize(dir.path()).unwrap();
    state
        .store()
        .set(&history_key("quiz-generator"), "{broken")
        .unwrap();
    let list = HistoryArgs {
        command: HistoryCommand::List {
            tool: "quiz-generator".to_string(),
            filter: None,
            json: false,
        },
    };
    let mut clipboard = MemoryClipboard::default();
    assert!(history::execute(&state, &list, &mut clipboard, &mut Vec::<u8>::new()).is_err());

    let purge = HistoryArgs {
        command: HistoryCommand::Purge {
            tool: "quiz-generator".to_string(),
            yes: true,
        },
    };
    let mut out: Vec<u8> = Vec::new();
    history::execute(&state, &purge, &mut clipboard, &mut out).unwrap();
    assert_eq!(output_of(out), "Deleted 0 run(s)\n");

    let mut out: Vec<u8> = Vec::new();
    history::execute(&state, &list, &mut clipboard, &mut out).unwrap();
    assert_eq!(output_of(out), "No runs.\n");
}

#[tokio::test]
async fn test_run_streams_output_and_records_history() {
    let server = MockServer::start().await;
    mount_quiz(&server, "1. What is chlorophyll?").await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_server(dir.path(), &server);

    let mut out: Vec<u8> = Vec::new();
    let mut clipboard = MemoryClipboard::default();
    let mut args = run_args(&["topic=Photosynthesis"]);
    args.copy = true;
    let record = run::execute(
        &state,
        &args,
        state.consumer().unwrap(),
        &mut clipboard,
        pending(),
        &mut out,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(output_of(out), "1. What is chlorophyll?\n");
    assert_eq!(clipboard.copies, vec!["1. What is chlorophyll?"]);

    // history list / show / search
    let mut out: Vec<u8> = Vec::new();
    let list = HistoryArgs {
        command: HistoryCommand::List {
            tool: "quiz-generator".to_string(),
            filter: None,
            json: false,
        },
    };
    history::execute(&state, &list, &mut clipboard, &mut out).unwrap();
    let listing = output_of(out);
    assert!(listing.starts_with("Today\n"));
    assert!(listing.contains(&record.id[..8]));
    assert!(listing.contains("Photosynthesis"));

    let mut out: Vec<u8> = Vec::new();
    let show = HistoryArgs {
        command: HistoryCommand::Show {
            tool: "quiz-generator".to_string(),
            id: record.id[..8].to_string(),
            json: true,
        },
    };
    history::execute(&state, &show, &mut clipboard, &mut out).unwrap();
    let shown: writedeck::ToolExecution = serde_json::from_slice(&out).unwrap();
    assert_eq!(shown, record);
}

#[tokio::test]
async fn test_run_json_emits_stream_events() {
    let server = MockServer::start().await;
    mount_quiz(&server, "Q1").await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_server(dir.path(), &server);

    let mut out: Vec<u8> = Vec::new();
    let mut args = run_args(&["topic=volcanoes"]);
    args.json = true;
    let record = run::execute(
        &state,
        &args,
        state.consumer().unwrap(),
        &mut MemoryClipboard::default(),
        pending(),
        &mut out,
    )
    .await
    .unwrap()
    .unwrap();

    let events: Vec<StreamEvent> = output_of(out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(matches!(events.first(), Some(StreamEvent::Started { .. })));
    assert_eq!(
        events.last(),
        Some(&StreamEvent::Complete {
            output: "Q1".to_string(),
            execution_id: Some(record.id),
        })
    );
    let streamed: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::TextDelta { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(streamed, "Q1");
}

#[tokio::test]
async fn test_run_failure_prints_fixed_message() {
    let server = MockServer::start().await;
    Mock::given(path("/api/quiz-generator"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_server(dir.path(), &server);

    let mut out: Vec<u8> = Vec::new();
    let err = run::execute(
        &state,
        &run_args(&["topic=x"]),
        state.consumer().unwrap(),
        &mut MemoryClipboard::default(),
        pending(),
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Llm(LlmError::Http { status: 502, .. })));
    assert_eq!(output_of(out), format!("{}\n", writedeck_llm::GENERATION_FAILED_MESSAGE));
    assert!(state.history("quiz-generator").unwrap().list().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_without_required_field_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(path("/api/quiz-generator"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_server(dir.path(), &server);

    let err = run::execute(
        &state,
        &run_args(&[]),
        state.consumer().unwrap(),
        &mut MemoryClipboard::default(),
        pending(),
        &mut Vec::<u8>::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Field 'topic' is required");
}

#[tokio::test]
async fn test_history_rename_delete_purge() {
    let server = MockServer::start().await;
    mount_quiz(&server, "output").await;
    let dir = tempfile::tempdir().unwrap();
    let state = state_with_server(dir.path(), &server);
    let mut clipboard = MemoryClipboard::default();

    let mut ids = Vec::new();
    for topic in ["topic=first", "topic=second"] {
        let record = run::execute(
            &state,
            &run_args(&[topic]),
            state.consumer().unwrap(),
            &mut clipboard,
            pending(),
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap()
        .unwrap();
        ids.push(record.id);
    }

    let rename = HistoryArgs {
        command: HistoryCommand::Rename {
            tool: "quiz-generator".to_string(),
            id: ids[0].clone(),
            title: "  Renamed run ".to_string(),
        },
    };
    history::execute(&state, &rename, &mut clipboard, &mut Vec::<u8>::new()).unwrap();
    let history_store = state.history("quiz-generator").unwrap();
    assert_eq!(history_store.get(&ids[0]).unwrap().unwrap().title, "Renamed run");

    let blank = HistoryArgs {
        command: HistoryCommand::Rename {
            tool: "quiz-generator".to_string(),
            id: ids[0].clone(),
            title: "   ".to_string(),
        },
    };
    assert!(matches!(
        history::execute(&state, &blank, &mut clipboard, &mut Vec::<u8>::new()),
        Err(AppError::Validation(_))
    ));

    let copy = HistoryArgs {
        command: HistoryCommand::Copy {
            tool: "quiz-generator".to_string(),
            id: ids[1].clone(),
        },
    };
    history::execute(&state, &copy, &mut clipboard, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(clipboard.copies.last().map(String::as_str), Some("output"));

    let delete = HistoryArgs {
        command: HistoryCommand::Delete {
            tool: "quiz-generator".to_string(),
            id: ids[0].clone(),
        },
    };
    history::execute(&state, &delete, &mut clipboard, &mut Vec::<u8>::new()).unwrap();
    let remaining = history_store.list().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ids[1]);

    let unconfirmed = HistoryArgs {
        command: HistoryCommand::Purge {
            tool: "quiz-generator".to_string(),
            yes: false,
        },
    };
    assert!(history::execute(&state, &unconfirmed, &mut clipboard, &mut Vec::<u8>::new()).is_err());
    assert_eq!(history_store.list().unwrap().len(), 1);

    let purge = HistoryArgs {
        command: HistoryCommand::Purge {
            tool: "quiz-generator".to_string(),
            yes: true,
        },
    };
    let mut out: Vec<u8> = Vec::new();
    history::execute(&state, &purge, &mut clipboard, &mut out).unwrap();
    assert_eq!(output_of(out), "Deleted 1 run(s)\n");
    assert!(history_store.list().unwrap().is_empty());
}

#[test]
fn test_key_show_is_masked() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::initialize(dir.path()).unwrap();

    let show = KeyArgs {
        command: KeyCommand::Show,
    };
    let mut out: Vec<u8> = Vec::new();
    key::execute(&state, &show, &mut out).unwrap();
    assert!(output_of(out).starts_with("No API key configured"));

    key::execute(
        &state,
        &KeyArgs {
            command: KeyCommand::Set {
                key: "sk-abcdefghwxyz".to_string(),
            },
        },
        &mut Vec::<u8>::new(),
    )
    .unwrap();
    let mut out: Vec<u8> = Vec::new();
    key::execute(&state, &show, &mut out).unwrap();
    assert_eq!(output_of(out), "sk-a…wxyz\n");

    key::execute(
        &state,
        &KeyArgs {
            command: KeyCommand::Delete,
        },
        &mut Vec::<u8>::new(),
    )
    .unwrap();
    assert!(!state.api_keys().has_key().unwrap());
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::initialize(dir.path()).unwrap();

    let bad = ConfigArgs {
        command: ConfigCommand::Set {
            key: "base_url".to_string(),
            value: "not a url".to_string(),
        },
    };
    assert!(config::execute(&mut state, &bad, &mut Vec::<u8>::new()).is_err());
    assert_eq!(state.config().base_url, "http://localhost:3000");

    let reset = ConfigArgs {
        command: ConfigCommand::Reset,
    };
    config::execute(&mut state, &reset, &mut Vec::<u8>::new()).unwrap();
    assert_eq!(state.config().base_url, "http://localhost:3000");
    let on_disk = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(on_disk.contains("http://localhost:3000"));
}

#[test]
fn test_tools_list() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::initialize(dir.path()).unwrap();

    let mut out: Vec<u8> = Vec::new();
    tools::execute(
        &state,
        &ToolsArgs {
            command: ToolsCommand::List { json: false },
        },
        &mut out,
    )
    .unwrap();
    let listing = output_of(out);
    assert_eq!(listing.lines().count(), 10);
    assert!(listing.starts_with("quiz-generator"));
}
