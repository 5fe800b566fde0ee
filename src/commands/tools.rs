//! `writedeck tools` command.

use std::io::Write;

use clap::{Args, Subcommand};
use writedeck_tools::{FieldKind, ToolDefinition};

use crate::state::AppState;
use crate::utils::error::AppResult;

/// Inspect the tool catalog.
#[derive(Debug, Args)]
pub struct ToolsArgs {
    #[command(subcommand)]
    pub command: ToolsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// List available tools.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a tool's form fields.
    Show {
        tool: String,
        #[arg(long)]
        json: bool,
    },
}

fn write_tool(tool: &ToolDefinition, out: &mut dyn Write) -> AppResult<()> {
    writeln!(out, "{} ({})", tool.name, tool.id)?;
    if !tool.description.is_empty() {
        writeln!(out, "{}", tool.description)?;
    }
    writeln!(out, "endpoint: POST {}", tool.endpoint)?;
    if tool.model_aware {
        writeln!(out, "accepts --model")?;
    }
    writeln!(out, "fields:")?;
    for field in &tool.fields {
        let required = if field.required { " (required)" } else { "" };
        write!(out, "  {:<18} {}{}", field.name, field.kind.label(), required)?;
        if let FieldKind::Select { options } = &field.kind {
            write!(out, ": {}", options.join(" | "))?;
        }
        if let Some(default) = &field.default {
            write!(out, " [default: {}]", default)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Executes the tools command.
pub fn execute(state: &AppState, args: &ToolsArgs, out: &mut dyn Write) -> AppResult<()> {
    match &args.command {
        ToolsCommand::List { json } => {
            let tools = state.catalog().list();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&tools)?)?;
                return Ok(());
            }
            for tool in tools {
                writeln!(out, "{:<22} {}", tool.id, tool.description)?;
            }
            Ok(())
        }
        ToolsCommand::Show { tool, json } => {
            let tool = state.tool(tool)?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(tool)?)?;
                return Ok(());
            }
            write_tool(tool, out)
        }
    }
}
