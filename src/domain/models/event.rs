use serde::{Deserialize, Serialize};

use crate::domain::errors::ActionError;

/// Lifecycle events the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEvent {
    /// The workload's execution environment became available
    RuntimeReady,
    /// Declared configuration was updated
    #[serde(alias = "config-changed")]
    ConfigurationChanged,
    /// The operator invoked the `restart` action
    RestartRequested,
}

impl LifecycleEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RuntimeReady => "runtime-ready",
            Self::ConfigurationChanged => "configuration-changed",
            Self::RestartRequested => "restart-requested",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log lines collected while running an operator action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub action: String,
    pub logs: Vec<String>,
}

impl ActionResult {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            logs: Vec::new(),
        }
    }

    pub fn log(&mut self, line: impl Into<String>) {
        self.logs.push(line.into());
    }
}

/// How a full reconciliation pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcome {
    /// The pass ran and left a terminal status
    Completed,
    /// The workload was unreachable; nothing ran and status is unchanged
    Deferred,
}

/// Result of handing one event to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Pass(PassOutcome),
    Action(Result<ActionResult, ActionError>),
}
