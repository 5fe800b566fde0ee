//! CLI Commands
//!
//! One module per subcommand. Each exposes its clap `Args` and an
//! `execute` function that writes to the given output.

pub mod config;
pub mod history;
pub mod key;
pub mod run;
pub mod tools;

pub use config::ConfigArgs;
pub use history::HistoryArgs;
pub use key::KeyArgs;
pub use run::RunArgs;
pub use tools::ToolsArgs;
