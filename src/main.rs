//! Writedeck CLI - form-driven text generation tools.

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use writedeck::commands;
use writedeck::services::SystemClipboard;
use writedeck::AppState;

/// Writedeck - run text generation tools and browse their history.
#[derive(Debug, Parser)]
#[command(name = "writedeck", version, about)]
struct Cli {
    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format: plain (default) or json.
    #[arg(long, global = true, default_value = "plain", value_parser = ["plain", "json"])]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List and inspect tools.
    Tools(commands::ToolsArgs),
    /// Run a tool, streaming its output.
    Run(commands::RunArgs),
    /// Browse, rename, delete and copy past runs.
    History(commands::HistoryArgs),
    /// Manage the API key.
    Key(commands::KeyArgs),
    /// Show or change settings.
    Config(commands::ConfigArgs),
}

fn init_tracing(verbose: u8, format: &str) {
    // Streamed output owns stdout; logs go to stderr. RUST_LOG wins when set.
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match format {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(true)
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    };
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, &cli.log_format);

    let mut state = AppState::from_env()?;
    tracing::debug!(dir = %state.data_dir().display(), "writedeck starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut clipboard = SystemClipboard;

    match &cli.command {
        Commands::Tools(args) => commands::tools::execute(&state, args, &mut out)?,
        Commands::Run(args) => {
            let consumer = state.consumer()?;
            let interrupt = async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            commands::run::execute(&state, args, consumer, &mut clipboard, interrupt, &mut out)
                .await?;
        }
        Commands::History(args) => {
            commands::history::execute(&state, args, &mut clipboard, &mut out)?
        }
        Commands::Key(args) => commands::key::execute(&state, args, &mut out)?,
        Commands::Config(args) => commands::config::execute(&mut state, args, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
