//! History Sidebar
//!
//! Presentation state for browsing a tool's history: records grouped by
//! local calendar date, a live title filter, and inline rename with at most
//! one row in edit mode.

use chrono::{Local, NaiveDate, TimeZone};

use crate::models::execution::ToolExecution;
use crate::services::history::{filter_by_title, HistoryStore};
use crate::utils::error::AppResult;

/// Records that fall on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGroup {
    pub date: NaiveDate,
    /// `Today`, `Yesterday`, or e.g. `Mar 4, 2024`
    pub label: String,
    pub entries: Vec<ToolExecution>,
}

/// Per-row state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Idle,
    Editing { draft: String },
}

/// Keys the rename field reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
}

/// What a key press in the rename field did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The title was saved.
    Saved(ToolExecution),
    /// Editing ended without a change.
    Cancelled,
    /// The row was not being edited.
    Ignored,
}

struct Editing {
    id: String,
    draft: String,
}

/// Sidebar over one tool's history.
pub struct HistorySidebar {
    history: HistoryStore,
    entries: Vec<ToolExecution>,
    filter: String,
    editing: Option<Editing>,
}

impl HistorySidebar {
    /// Load the sidebar for `history`.
    pub fn new(history: HistoryStore) -> AppResult<Self> {
        let entries = history.list()?;
        Ok(Self {
            history,
            entries,
            filter: String::new(),
            editing: None,
        })
    }

    /// Reload entries from the store. An edit whose row disappeared is dropped.
    pub fn refresh(&mut self) -> AppResult<()> {
        self.entries = self.history.list()?;
        if let Some(editing) = &self.editing {
            if !self.entries.iter().any(|e| e.id == editing.id) {
                self.editing = None;
            }
        }
        Ok(())
    }

    pub fn set_filter(&mut self, text: &str) {
        self.filter = text.to_string();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Entries matching the current filter, newest first.
    pub fn visible(&self) -> Vec<ToolExecution> {
        filter_by_title(self.entries.clone(), &self.filter)
    }

    /// Visible entries grouped by local date, newest date first.
    pub fn groups(&self) -> Vec<DateGroup> {
        self.groups_in(&Local, Local::now().date_naive())
    }

    /// Visible entries grouped by date in `tz`, labelled relative to `today`.
    pub fn groups_in<Tz: TimeZone>(&self, tz: &Tz, today: NaiveDate) -> Vec<DateGroup> {
        let mut groups: Vec<DateGroup> = Vec::new();
        for entry in self.visible() {
            let Some(date) = local_date(tz, entry.timestamp) else {
                tracing::warn!(id = %entry.id, timestamp = entry.timestamp, "skipping record with invalid timestamp");
                continue;
            };
            match groups.iter_mut().find(|g| g.date == date) {
                Some(group) => group.entries.push(entry),
                None => groups.push(DateGroup {
                    date,
                    label: date_label(date, today),
                    entries: vec![entry],
                }),
            }
        }
        groups.sort_by(|a, b| b.date.cmp(&a.date));
        groups
    }

    pub fn row_state(&self, id: &str) -> RowState {
        match &self.editing {
            Some(editing) if editing.id == id => RowState::Editing {
                draft: editing.draft.clone(),
            },
            _ => RowState::Idle,
        }
    }

    /// Put a row into edit mode, seeding the draft with its title. Any
    /// other row being edited is cancelled. Returns false for unknown ids.
    pub fn begin_rename(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.id == id) else {
            return false;
        };
        self.editing = Some(Editing {
            id: id.to_string(),
            draft: entry.title.clone(),
        });
        true
    }

    /// Replace the draft of the row being edited.
    pub fn edit_draft(&mut self, id: &str, text: &str) -> bool {
        match &mut self.editing {
            Some(editing) if editing.id == id => {
                editing.draft = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Enter saves the draft (a blank draft cancels), Escape cancels.
    pub fn handle_key(&mut self, id: &str, key: EditKey) -> AppResult<EditOutcome> {
        let editing = match self.editing.take() {
            Some(editing) if editing.id == id => editing,
            other => {
                self.editing = other;
                return Ok(EditOutcome::Ignored);
            }
        };

        if key == EditKey::Escape || editing.draft.trim().is_empty() {
            return Ok(EditOutcome::Cancelled);
        }

        match self.history.rename(id, &editing.draft)? {
            Some(updated) => {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
                    *entry = updated.clone();
                }
                Ok(EditOutcome::Saved(updated))
            }
            None => {
                self.refresh()?;
                Ok(EditOutcome::Cancelled)
            }
        }
    }

    /// Delete a record. Returns false if it was already gone.
    pub fn delete(&mut self, id: &str) -> AppResult<bool> {
        let removed = self.history.remove(id)?;
        if self.editing.as_ref().is_some_and(|e| e.id == id) {
            self.editing = None;
        }
        self.entries.retain(|e| e.id != id);
        Ok(removed)
    }

    /// Hand the record to `on_select`. Returns false for unknown ids.
    pub fn select<F>(&self, id: &str, on_select: F) -> bool
    where
        F: FnOnce(&ToolExecution),
    {
        match self.entries.iter().find(|e| e.id == id) {
            Some(entry) => {
                on_select(entry);
                true
            }
            None => false,
        }
    }
}

fn local_date<Tz: TimeZone>(tz: &Tz, timestamp_ms: i64) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.date_naive())
}

fn date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}
