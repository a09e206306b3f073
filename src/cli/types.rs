//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::models::LifecycleEvent;

#[derive(Parser, Debug)]
#[command(name = "smokeping-operator")]
#[command(about = "Lifecycle operator for a containerized Smokeping", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Extra configuration file merged over .smokeping-operator/*.yaml
    #[arg(short, long, global = true, env = "SMOKEPING_OPERATOR_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reconciliation pass for a lifecycle event
    Event(EventArgs),

    /// Run an operator action
    #[command(subcommand)]
    Action(ActionCommands),

    /// Read newline-delimited JSON events from stdin and handle them in order
    Serve,

    /// Show the last published status
    Status,
}

#[derive(Args, Debug)]
pub struct EventArgs {
    /// Event to handle
    #[arg(value_enum)]
    pub kind: EventKind,
}

/// Lifecycle events that trigger a full pass.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The workload became reachable
    RuntimeReady,
    /// Declared configuration changed
    ConfigChanged,
}

impl From<EventKind> for LifecycleEvent {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::RuntimeReady => Self::RuntimeReady,
            EventKind::ConfigChanged => Self::ConfigurationChanged,
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCommands {
    /// Restart the Smokeping service
    Restart,
}
