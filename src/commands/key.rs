//! `writedeck key` command.

use std::io::Write;

use clap::{Args, Subcommand};

use crate::state::AppState;
use crate::storage::credentials::mask;
use crate::utils::error::AppResult;

/// Manage the API key sent with generation requests.
#[derive(Debug, Args)]
pub struct KeyArgs {
    #[command(subcommand)]
    pub command: KeyCommand,
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Store the API key.
    Set {
        /// The key. Falls back to $WRITEDECK_API_KEY when omitted.
        #[arg(env = "WRITEDECK_API_KEY", hide_env_values = true)]
        key: String,
    },
    /// Show the stored key, masked.
    Show,
    /// Delete the stored key.
    Delete,
}

/// Executes the key command.
pub fn execute(state: &AppState, args: &KeyArgs, out: &mut dyn Write) -> AppResult<()> {
    let keys = state.api_keys();
    match &args.command {
        KeyCommand::Set { key } => {
            keys.set(key)?;
            tracing::info!("API key stored");
            writeln!(out, "API key saved ({})", mask(key.trim()))?;
        }
        KeyCommand::Show => match keys.get()? {
            Some(key) => writeln!(out, "{}", mask(&key))?,
            None => writeln!(out, "No API key configured. Run `writedeck key set <KEY>`.")?,
        },
        KeyCommand::Delete => {
            keys.delete()?;
            writeln!(out, "API key deleted")?;
        }
    }
    Ok(())
}
