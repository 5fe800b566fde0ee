//! `writedeck config` command.

use std::io::Write;

use clap::{Args, Subcommand};

use crate::models::settings::SettingsUpdate;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};

/// Read and change settings in config.json.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the current settings.
    Show,
    /// Change one setting.
    Set {
        /// One of: base_url, default_model, connect_timeout_secs, proxy, copy_to_clipboard
        key: String,
        /// New value (an empty proxy removes it).
        value: String,
    },
    /// Restore the default settings.
    Reset,
}

/// Executes the config command.
pub fn execute(state: &mut AppState, args: &ConfigArgs, out: &mut dyn Write) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(state.config())?)?;
        }
        ConfigCommand::Set { key, value } => {
            let update = SettingsUpdate::from_pair(key, value).map_err(AppError::validation)?;
            state.config_service_mut().update_config(update)?;
            tracing::info!(key = %key, "setting updated");
            writeln!(out, "Set {}", key)?;
        }
        ConfigCommand::Reset => {
            state.config_service_mut().reset()?;
            writeln!(out, "Settings reset to defaults")?;
        }
    }
    Ok(())
}
