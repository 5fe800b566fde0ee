//! `writedeck history` command.

use std::io::Write;

use clap::{Args, Subcommand};

use crate::models::execution::ToolExecution;
use crate::services::clipboard::{copy_output, ClipboardSink};
use crate::services::history::HistoryStore;
use crate::services::sidebar::{EditKey, EditOutcome, HistorySidebar};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Browse and edit a tool's past runs.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List runs grouped by date, newest first.
    List {
        tool: String,
        /// Only runs whose title contains this text (case-insensitive).
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Search run titles (case-insensitive).
    Search {
        tool: String,
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one run's inputs and output.
    Show {
        tool: String,
        /// Run id or a unique prefix of it.
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Rename a run.
    Rename {
        tool: String,
        id: String,
        title: String,
    },
    /// Delete a run.
    Delete { tool: String, id: String },
    /// Copy a run's output to the clipboard.
    Copy { tool: String, id: String },
    /// Delete every run of a tool.
    Purge {
        tool: String,
        /// Required to confirm.
        #[arg(long)]
        yes: bool,
    },
}

/// Resolve a full id or a unique id prefix.
pub fn resolve_id(history: &HistoryStore, id_or_prefix: &str) -> AppResult<ToolExecution> {
    let needle = id_or_prefix.trim();
    if needle.is_empty() {
        return Err(AppError::validation("Run id cannot be empty"));
    }
    let mut matches: Vec<ToolExecution> = history
        .list()?
        .into_iter()
        .filter(|r| r.id.starts_with(needle))
        .collect();
    if let Some(exact) = matches.iter().position(|r| r.id == needle) {
        return Ok(matches.swap_remove(exact));
    }
    match matches.len() {
        0 => Err(AppError::not_found(format!(
            "No run '{}' in {} history",
            needle,
            history.tool_id()
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(AppError::validation(format!(
            "Run id '{}' is ambiguous ({} matches)",
            needle, n
        ))),
    }
}

/// Rename through the sidebar's inline edit. A record that vanished after
/// the sidebar loaded is reported as not found.
fn rename_in_sidebar(
    sidebar: &mut HistorySidebar,
    id: &str,
    title: &str,
) -> AppResult<ToolExecution> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title cannot be empty"));
    }
    if !sidebar.begin_rename(id) {
        return Err(AppError::not_found(format!("Run '{}' no longer exists", id)));
    }
    sidebar.edit_draft(id, title);
    match sidebar.handle_key(id, EditKey::Enter)? {
        EditOutcome::Saved(updated) => Ok(updated),
        EditOutcome::Cancelled | EditOutcome::Ignored => Err(AppError::not_found(format!(
            "Run '{}' no longer exists",
            id
        ))),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn local_time(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

fn write_json<T: serde::Serialize>(out: &mut dyn Write, value: &T) -> AppResult<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn write_grouped(sidebar: &HistorySidebar, out: &mut dyn Write) -> AppResult<()> {
    let groups = sidebar.groups();
    if groups.is_empty() {
        writeln!(out, "No runs.")?;
        return Ok(());
    }
    for group in groups {
        writeln!(out, "{}", group.label)?;
        for entry in &group.entries {
            writeln!(
                out,
                "  {}  {}  {}",
                short_id(&entry.id),
                local_time(entry.timestamp),
                entry.title
            )?;
        }
    }
    Ok(())
}

/// Executes the history command.
pub fn execute(
    state: &AppState,
    args: &HistoryArgs,
    clipboard: &mut dyn ClipboardSink,
    out: &mut dyn Write,
) -> AppResult<()> {
    match &args.command {
        HistoryCommand::List { tool, filter, json } => {
            let mut sidebar = HistorySidebar::new(state.history(tool)?)?;
            if let Some(filter) = filter {
                sidebar.set_filter(filter);
            }
            if *json {
                write_json(out, &sidebar.visible())
            } else {
                write_grouped(&sidebar, out)
            }
        }
        HistoryCommand::Search { tool, query, json } => {
            let hits = state.history(tool)?.search(query)?;
            if *json {
                return write_json(out, &hits);
            }
            if hits.is_empty() {
                writeln!(out, "No runs match '{}'.", query)?;
            }
            for hit in hits {
                writeln!(out, "{}  {}", short_id(&hit.id), hit.title)?;
            }
            Ok(())
        }
        HistoryCommand::Show { tool, id, json } => {
            let record = resolve_id(&state.history(tool)?, id)?;
            if *json {
                return write_json(out, &record);
            }
            writeln!(out, "{}", record.title)?;
            writeln!(out, "id: {}", record.id)?;
            if let Some(model) = &record.model {
                writeln!(out, "model: {}", model)?;
            }
            for (name, value) in &record.inputs {
                writeln!(out, "{}: {}", name, value)?;
            }
            writeln!(out)?;
            writeln!(out, "{}", record.output)?;
            if let Some(sections) = &record.outputs {
                for (name, text) in sections {
                    writeln!(out, "\n[{}]\n{}", name, text)?;
                }
            }
            Ok(())
        }
        HistoryCommand::Rename { tool, id, title } => {
            let history = state.history(tool)?;
            let record = resolve_id(&history, id)?;
            let mut sidebar = HistorySidebar::new(history)?;
            let updated = rename_in_sidebar(&mut sidebar, &record.id, title)?;
            writeln!(out, "Renamed {} to '{}'", short_id(&updated.id), updated.title)?;
            Ok(())
        }
        HistoryCommand::Delete { tool, id } => {
            let history = state.history(tool)?;
            let record = resolve_id(&history, id)?;
            let mut sidebar = HistorySidebar::new(history)?;
            if sidebar.delete(&record.id)? {
                writeln!(out, "Deleted {}", short_id(&record.id))?;
            }
            Ok(())
        }
        HistoryCommand::Copy { tool, id } => {
            let history = state.history(tool)?;
            let record = resolve_id(&history, id)?;
            let sidebar = HistorySidebar::new(history)?;
            let mut copied = Ok(());
            sidebar.select(&record.id, |selected| {
                copied = copy_output(clipboard, &selected.output);
            });
            copied?;
            writeln!(out, "Copied output of {} to the clipboard", short_id(&record.id))?;
            Ok(())
        }
        HistoryCommand::Purge { tool, yes } => {
            if !*yes {
                return Err(AppError::validation(
                    "Purging deletes every run of this tool; pass --yes to confirm",
                ));
            }
            let count = state.history(tool)?.purge()?;
            writeln!(out, "Deleted {} run(s)", count)?;
            Ok(())
        }
    }
}
