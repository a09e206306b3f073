//! Output formatting utilities for the CLI.

use console::{style, StyledObject};
use serde::Serialize;

use crate::domain::models::ReconciliationStatus;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// One JSON document per line, for streaming commands.
pub fn output_line<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", result.to_json());
    } else {
        println!("{}", result.to_human());
    }
}

/// Colored status label. Respects `NO_COLOR` and non-terminal output.
pub fn colorize_status(status: ReconciliationStatus) -> StyledObject<&'static str> {
    let label = style(status.as_str());
    match status {
        ReconciliationStatus::Active => label.green().bold(),
        ReconciliationStatus::Maintenance => label.yellow(),
        ReconciliationStatus::Blocked => label.red().bold(),
        ReconciliationStatus::Idle => label.dim(),
    }
}
