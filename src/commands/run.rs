//! `writedeck run` command.

use std::future::Future;
use std::io::Write;

use clap::Args;
use writedeck_core::StreamEvent;
use writedeck_llm::{StreamConsumer, GENERATION_FAILED_MESSAGE};
use writedeck_tools::{FieldValue, ToolDefinition, ToolError};

use crate::models::execution::ToolExecution;
use crate::services::clipboard::{copy_output, ClipboardSink};
use crate::services::session::{SubmissionState, SubmitOutcome};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Run a tool and stream its output.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Tool id (see `writedeck tools list`).
    pub tool: String,

    /// Form field as NAME=VALUE. Repeatable.
    #[arg(short, long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Model for model-aware tools (defaults to the configured model).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Copy the output to the clipboard when the run completes.
    #[arg(long)]
    pub copy: bool,

    /// Emit newline-delimited JSON stream events instead of plain text.
    #[arg(long)]
    pub json: bool,
}

/// Parse one `NAME=VALUE` argument against the tool's fields.
pub fn parse_field_arg(tool: &ToolDefinition, raw: &str) -> AppResult<(String, FieldValue)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| AppError::validation(format!("Expected NAME=VALUE, got '{}'", raw)))?;
    let name = name.trim();
    let spec = tool.field_spec(name).ok_or_else(|| ToolError::UnknownField {
        tool: tool.id.clone(),
        field: name.to_string(),
    })?;
    let value = FieldValue::parse_for(&spec.kind, value)
        .ok_or_else(|| ToolError::invalid_value(name, "expected true or false"))?;
    Ok((name.to_string(), value))
}

/// Writes the session's output as it grows.
struct Renderer {
    json: bool,
    tool_id: String,
    printed: String,
    started: bool,
}

impl Renderer {
    fn new(json: bool, tool_id: &str) -> Self {
        Self {
            json,
            tool_id: tool_id.to_string(),
            printed: String::new(),
            started: false,
        }
    }

    fn emit(out: &mut dyn Write, event: &StreamEvent) -> AppResult<()> {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
        Ok(())
    }

    fn start(&mut self, generation: u64, out: &mut dyn Write) -> AppResult<()> {
        if self.json && !self.started {
            Self::emit(
                out,
                &StreamEvent::Started {
                    tool_id: self.tool_id.clone(),
                    generation,
                },
            )?;
        }
        self.started = true;
        Ok(())
    }

    /// Write whatever `output` adds to what has been written so far.
    fn push(&mut self, output: &str, out: &mut dyn Write) -> AppResult<()> {
        let Some(delta) = output.strip_prefix(self.printed.as_str()) else {
            return Ok(());
        };
        if delta.is_empty() {
            return Ok(());
        }
        if self.json {
            Self::emit(
                out,
                &StreamEvent::TextDelta {
                    content: delta.to_string(),
                },
            )?;
        } else {
            write!(out, "{}", delta)?;
            out.flush()?;
        }
        self.printed = output.to_string();
        Ok(())
    }

    fn end_line(&self, out: &mut dyn Write) -> AppResult<()> {
        if !self.json && !self.printed.is_empty() && !self.printed.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }

    fn complete(&mut self, generation: u64, record: &ToolExecution, out: &mut dyn Write) -> AppResult<()> {
        self.start(generation, out)?;
        self.push(&record.output, out)?;
        self.end_line(out)?;
        if self.json {
            Self::emit(
                out,
                &StreamEvent::Complete {
                    output: record.output.clone(),
                    execution_id: Some(record.id.clone()),
                },
            )?;
        }
        Ok(())
    }

    fn cancelled(&mut self, out: &mut dyn Write) -> AppResult<()> {
        self.end_line(out)?;
        if self.json {
            Self::emit(out, &StreamEvent::Cancelled)?;
        }
        Ok(())
    }

    fn failed(&mut self, out: &mut dyn Write) -> AppResult<()> {
        self.end_line(out)?;
        if self.json {
            Self::emit(
                out,
                &StreamEvent::Error {
                    message: GENERATION_FAILED_MESSAGE.to_string(),
                },
            )?;
        } else {
            writeln!(out, "{}", GENERATION_FAILED_MESSAGE)?;
        }
        Ok(())
    }
}

/// Executes the run command.
///
/// `interrupt` resolving stops the generation (the binary wires it to
/// Ctrl-C); a stopped run is not an error and is not recorded.
pub async fn execute<I>(
    state: &AppState,
    args: &RunArgs,
    consumer: StreamConsumer,
    clipboard: &mut dyn ClipboardSink,
    interrupt: I,
    out: &mut dyn Write,
) -> AppResult<Option<ToolExecution>>
where
    I: Future<Output = ()>,
{
    let session = state.open_session(&args.tool, consumer, args.model.clone())?;
    // Start from a blank form rather than the restored run's inputs.
    session.clear();
    for raw in &args.fields {
        let (name, value) = parse_field_arg(session.tool(), raw)?;
        session.set_field(&name, value)?;
    }

    let mut renderer = Renderer::new(args.json, &session.tool().id);
    let mut rx = session.subscribe();
    let submit = session.submit();
    tokio::pin!(submit);
    tokio::pin!(interrupt);
    let mut interrupted = false;
    let mut watching = true;

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome?,
            changed = rx.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let view = rx.borrow_and_update().clone();
                if view.state == SubmissionState::Streaming {
                    renderer.start(session.generation(), out)?;
                    renderer.push(&view.output, out)?;
                }
            }
            _ = &mut interrupt, if !interrupted => {
                interrupted = true;
                tracing::info!(tool = %args.tool, "interrupted; stopping generation");
                session.stop();
            }
        }
    };

    match outcome {
        SubmitOutcome::Completed(record) => {
            renderer.complete(session.generation(), &record, out)?;
            if args.copy || state.config().copy_to_clipboard {
                if let Err(e) = copy_output(clipboard, &record.output) {
                    tracing::warn!(error = %e, "could not copy output");
                }
            }
            Ok(Some(record))
        }
        SubmitOutcome::Cancelled => {
            renderer.cancelled(out)?;
            Ok(None)
        }
        SubmitOutcome::Failed(e) => {
            renderer.failed(out)?;
            Err(e.into())
        }
        other => other.into_result().map(Some),
    }
}
