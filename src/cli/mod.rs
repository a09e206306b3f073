//! Command-line interface.

pub mod commands;
pub mod output;
pub mod runtime;
pub mod types;

pub use types::{ActionCommands, Cli, Commands, EventArgs, EventKind};

/// Print `err` and exit with a failure code.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1)
}
