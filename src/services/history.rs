//! Execution History
//!
//! Per-tool history of completed runs, kept as one JSON array under
//! `history:<tool-id>` in the shared key-value store. The array is stored
//! newest-first; every operation re-reads it so other processes' writes are
//! picked up.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use writedeck_core::KeyValueStore;

use crate::models::execution::{ExecutionUpdate, NewExecution, ToolExecution};
use crate::utils::error::{AppError, AppResult};

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Store key of a tool's history collection.
pub fn history_key(tool_id: &str) -> String {
    format!("history:{}", tool_id)
}

/// CRUD over one tool's history collection
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    tool_id: String,
    key: String,
    clock: Arc<dyn Clock>,
}

impl HistoryStore {
    /// History of `tool_id`, timestamped with the system clock
    pub fn for_tool(store: Arc<dyn KeyValueStore>, tool_id: &str) -> Self {
        Self {
            store,
            tool_id: tool_id.to_string(),
            key: history_key(tool_id),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    fn load(&self) -> AppResult<Vec<ToolExecution>> {
        match self.store.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                tracing::warn!(tool = %self.tool_id, error = %e, "history collection is corrupt");
                AppError::from(e)
            }),
        }
    }

    fn save(&self, records: &[ToolExecution]) -> AppResult<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(&self.key, &raw)?;
        Ok(())
    }

    /// All records, newest first. Equal timestamps keep the later
    /// insertion first.
    pub fn list(&self) -> AppResult<Vec<ToolExecution>> {
        let mut records = self.load()?;
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Store a new record, assigning its id and timestamp.
    pub fn append(&self, new: NewExecution) -> AppResult<ToolExecution> {
        let mut records = self.load()?;
        let record = new.into_execution(uuid::Uuid::new_v4().to_string(), self.clock.now_millis());
        records.insert(0, record.clone());
        self.save(&records)?;
        tracing::debug!(tool = %self.tool_id, id = %record.id, "appended history record");
        Ok(record)
    }

    pub fn get(&self, id: &str) -> AppResult<Option<ToolExecution>> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    /// The most recent record, if any.
    pub fn latest(&self) -> AppResult<Option<ToolExecution>> {
        Ok(self.list()?.into_iter().next())
    }

    /// Patch a record. Returns `Ok(None)` without writing if `id` is unknown.
    pub fn update(&self, id: &str, update: ExecutionUpdate) -> AppResult<Option<ToolExecution>> {
        let mut records = self.load()?;
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        record.apply_update(update);
        let updated = record.clone();
        self.save(&records)?;
        Ok(Some(updated))
    }

    /// Change a record's title. The title is trimmed and must not be empty.
    pub fn rename(&self, id: &str, title: &str) -> AppResult<Option<ToolExecution>> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::validation("Title cannot be empty"));
        }
        self.update(id, ExecutionUpdate::title(title))
    }

    /// Delete a record. Returns `Ok(false)` if `id` is unknown.
    pub fn remove(&self, id: &str) -> AppResult<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.save(&records)?;
        tracing::debug!(tool = %self.tool_id, id, "removed history record");
        Ok(true)
    }

    /// Records whose title contains `query`, ignoring case. An empty query
    /// matches everything.
    pub fn search(&self, query: &str) -> AppResult<Vec<ToolExecution>> {
        let records = self.list()?;
        Ok(filter_by_title(records, query))
    }

    /// Delete the whole collection. Returns the number of records removed.
    ///
    /// An unparseable collection is removed as well and counts as zero.
    pub fn purge(&self) -> AppResult<usize> {
        let count = match self.store.get(&self.key)? {
            None => 0,
            Some(raw) => match serde_json::from_str::<Vec<ToolExecution>>(&raw) {
                Ok(records) => records.len(),
                Err(e) => {
                    tracing::warn!(tool = %self.tool_id, error = %e, "purging corrupt history collection");
                    0
                }
            },
        };
        self.store.remove(&self.key)?;
        tracing::info!(tool = %self.tool_id, count, "purged history");
        Ok(count)
    }
}

/// Keep the records whose title contains `query`, ignoring case.
pub(crate) fn filter_by_title(records: Vec<ToolExecution>, query: &str) -> Vec<ToolExecution> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.title.to_lowercase().contains(&query_lower))
        .collect()
}
