//! Tool Session
//!
//! Runtime state of one form-driven tool: the form inputs, the output being
//! streamed, and the history record currently shown. Every change is
//! published as a `SessionView` on a watch channel so a renderer can follow
//! output as it arrives.
//!
//! Submissions are numbered. A new submission (or `stop`, `clear`,
//! `restore`) cancels the one in flight and bumps the generation; anything a
//! superseded submission produces afterwards is discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use writedeck_llm::{
    GenerationRequest, LlmError, StreamConsumer, StreamOutcome, GENERATION_FAILED_MESSAGE,
};
use writedeck_tools::{FieldValue, FormInputs, ToolDefinition, ToolError};

use crate::models::execution::{NewExecution, ToolExecution};
use crate::services::history::HistoryStore;
use crate::storage::credentials::ApiKeyStore;
use crate::utils::error::{AppError, AppResult};

/// Where the session is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Streaming,
    Error,
}

/// Snapshot published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub state: SubmissionState,
    pub output: String,
    /// History record the output belongs to, if any
    pub active_id: Option<String>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            state: SubmissionState::Idle,
            output: String::new(),
            active_id: None,
        }
    }
}

/// How a call to `submit` ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The form failed validation; nothing was sent.
    Invalid(ToolError),
    /// No API key is configured; nothing was sent.
    MissingApiKey,
    /// The stream finished and the run was recorded.
    Completed(ToolExecution),
    /// Stopped, or superseded by a newer submission. Nothing was recorded.
    Cancelled,
    /// The request failed; the view shows the generic failure message.
    Failed(LlmError),
}

struct SessionInner {
    inputs: FormInputs,
    view: SessionView,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl SessionInner {
    /// Cancel whatever is in flight and invalidate its generation.
    fn supersede(&mut self) -> u64 {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.generation += 1;
        self.generation
    }
}

/// One tool's form, output and submit cycle.
pub struct ToolSession {
    tool: ToolDefinition,
    history: HistoryStore,
    keys: ApiKeyStore,
    consumer: StreamConsumer,
    model: Option<String>,
    inner: Arc<Mutex<SessionInner>>,
    view_tx: Arc<watch::Sender<SessionView>>,
}

impl ToolSession {
    /// Start a session, restoring the most recent history record if there
    /// is one.
    pub fn open(
        tool: ToolDefinition,
        history: HistoryStore,
        keys: ApiKeyStore,
        consumer: StreamConsumer,
    ) -> AppResult<Self> {
        let latest = history.latest()?;
        let (view_tx, _) = watch::channel(SessionView::default());
        let session = Self {
            inner: Arc::new(Mutex::new(SessionInner {
                inputs: tool.blank_inputs(),
                view: SessionView::default(),
                generation: 0,
                cancel: None,
            })),
            tool,
            history,
            keys,
            consumer,
            model: None,
            view_tx: Arc::new(view_tx),
        };
        if let Some(record) = latest {
            tracing::debug!(tool = %session.tool.id, id = %record.id, "restoring latest run");
            session.restore(&record);
        }
        Ok(session)
    }

    /// Model sent to model-aware tools.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model.filter(|m| !m.trim().is_empty());
        self
    }

    pub fn tool(&self) -> &ToolDefinition {
        &self.tool
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Follow the session's output.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    /// Current snapshot.
    pub fn view(&self) -> SessionView {
        self.lock().view.clone()
    }

    /// Current generation. Every submission, `clear` and `restore` moves it on.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn inputs(&self) -> FormInputs {
        self.lock().inputs.clone()
    }

    /// Set one form field. The field must exist on the tool.
    pub fn set_field(&self, name: &str, value: FieldValue) -> AppResult<()> {
        if self.tool.field_spec(name).is_none() {
            return Err(ToolError::UnknownField {
                tool: self.tool.id.clone(),
                field: name.to_string(),
            }
            .into());
        }
        self.lock().inputs.insert(name.to_string(), value);
        Ok(())
    }

    /// Whether every required field has a value.
    pub fn can_submit(&self) -> bool {
        self.tool.can_submit(&self.lock().inputs)
    }

    /// Run the tool with the current inputs.
    ///
    /// Storage failures while recording the run are returned as errors; the
    /// generated output stays in the view.
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        let inputs = self.inputs();
        if let Err(e) = self.tool.validate(&inputs) {
            tracing::debug!(tool = %self.tool.id, error = %e, "form rejected");
            return Ok(SubmitOutcome::Invalid(e));
        }

        let Some(api_key) = self.keys.get()? else {
            tracing::info!(tool = %self.tool.id, "no API key configured; request not sent");
            return Ok(SubmitOutcome::MissingApiKey);
        };

        let token = CancellationToken::new();
        let generation = {
            let mut inner = self.lock();
            let generation = inner.supersede();
            inner.cancel = Some(token.clone());
            inner.view = SessionView {
                state: SubmissionState::Streaming,
                output: String::new(),
                active_id: None,
            };
            self.view_tx.send_replace(inner.view.clone());
            generation
        };

        let model = self.model.clone();
        let request = GenerationRequest::new(
            self.tool.id.clone(),
            self.tool.endpoint.clone(),
            self.tool.payload(&inputs, model.as_deref()),
        );
        tracing::info!(tool = %self.tool.id, generation, backend = self.consumer.backend_name(), "submitting");

        let inner = Arc::clone(&self.inner);
        let view_tx = Arc::clone(&self.view_tx);
        let mut sink = move |_delta: &str, accumulated: &str| {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            if inner.generation != generation {
                return;
            }
            inner.view.output = accumulated.to_string();
            view_tx.send_replace(inner.view.clone());
        };

        let result = self
            .consumer
            .run(&request, Some(&api_key), &token, &mut sink)
            .await;

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!(tool = %self.tool.id, generation, "superseded submission finished");
            return Ok(SubmitOutcome::Cancelled);
        }
        inner.cancel = None;

        match result {
            Ok(StreamOutcome::Completed { output }) => {
                inner.view.output = output.clone();
                inner.view.state = SubmissionState::Idle;
                let new = NewExecution::new(self.tool.derive_title(&inputs), inputs, output)
                    .with_model(model.filter(|_| self.tool.model_aware));
                match self.history.append(new) {
                    Ok(record) => {
                        inner.view.active_id = Some(record.id.clone());
                        self.view_tx.send_replace(inner.view.clone());
                        tracing::info!(tool = %self.tool.id, id = %record.id, "run recorded");
                        Ok(SubmitOutcome::Completed(record))
                    }
                    Err(e) => {
                        self.view_tx.send_replace(inner.view.clone());
                        tracing::warn!(tool = %self.tool.id, error = %e, "failed to record run");
                        Err(e)
                    }
                }
            }
            Ok(StreamOutcome::Cancelled { partial }) => {
                tracing::info!(tool = %self.tool.id, chars = partial.chars().count(), "submission stopped");
                inner.view.state = SubmissionState::Idle;
                self.view_tx.send_replace(inner.view.clone());
                Ok(SubmitOutcome::Cancelled)
            }
            Err(LlmError::MissingApiKey) => {
                inner.view.state = SubmissionState::Idle;
                self.view_tx.send_replace(inner.view.clone());
                Ok(SubmitOutcome::MissingApiKey)
            }
            Err(e) => {
                tracing::error!(tool = %self.tool.id, error = %e, "generation failed");
                inner.view.state = SubmissionState::Error;
                inner.view.output = GENERATION_FAILED_MESSAGE.to_string();
                self.view_tx.send_replace(inner.view.clone());
                Ok(SubmitOutcome::Failed(e))
            }
        }
    }

    /// Cancel the submission in flight, if any. Output received so far
    /// stays visible.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if let Some(token) = inner.cancel.take() {
            tracing::debug!(tool = %self.tool.id, generation = inner.generation, "stop requested");
            token.cancel();
        }
    }

    /// Start over: cancel, detach the active record and blank the form.
    /// History is untouched.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.supersede();
        inner.inputs = self.tool.blank_inputs();
        inner.view = SessionView::default();
        self.view_tx.send_replace(inner.view.clone());
    }

    /// Show a past run: its inputs fill the form and its output replaces
    /// the current one.
    pub fn restore(&self, record: &ToolExecution) {
        let mut inner = self.lock();
        inner.supersede();
        let mut inputs = self.tool.blank_inputs();
        for (name, value) in &record.inputs {
            if self.tool.field_spec(name).is_some() {
                inputs.insert(name.clone(), value.clone());
            }
        }
        inner.inputs = inputs;
        inner.view = SessionView {
            state: SubmissionState::Idle,
            output: record.output.clone(),
            active_id: Some(record.id.clone()),
        };
        self.view_tx.send_replace(inner.view.clone());
    }
}

impl Drop for ToolSession {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
    }
}

impl SubmitOutcome {
    /// Treat anything short of a recorded run as an error.
    pub fn into_result(self) -> AppResult<ToolExecution> {
        match self {
            SubmitOutcome::Completed(record) => Ok(record),
            SubmitOutcome::Invalid(e) => Err(e.into()),
            SubmitOutcome::MissingApiKey => Err(LlmError::MissingApiKey.into()),
            SubmitOutcome::Cancelled => Err(AppError::internal("Generation was cancelled")),
            SubmitOutcome::Failed(e) => Err(e.into()),
        }
    }
}
