//! Single lifecycle event.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::output::{colorize_status, output, CommandOutput};
use crate::cli::runtime::OperatorRuntime;
use crate::cli::types::EventArgs;
use crate::domain::models::{Dispatched, LifecycleEvent, OperatorConfig, PassOutcome, UnitStatus};

#[derive(Debug, Serialize)]
pub struct PassOutput {
    pub event: LifecycleEvent,
    pub outcome: PassOutcome,
    #[serde(flatten)]
    pub status: UnitStatus,
}

impl CommandOutput for PassOutput {
    fn to_human(&self) -> String {
        match self.outcome {
            PassOutcome::Deferred => format!(
                "{}: workload not reachable, pass deferred (status {})",
                self.event,
                colorize_status(self.status.status)
            ),
            PassOutcome::Completed => match &self.status.message {
                Some(message) => format!(
                    "{}: {} ({message})",
                    self.event,
                    colorize_status(self.status.status)
                ),
                None => format!("{}: {}", self.event, colorize_status(self.status.status)),
            },
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Map a pass result to its printable form.
pub fn pass_output(event: LifecycleEvent, outcome: PassOutcome, status: &UnitStatus) -> PassOutput {
    PassOutput {
        event,
        outcome,
        status: status.clone(),
    }
}

pub async fn execute(args: EventArgs, config: OperatorConfig, json_mode: bool) -> Result<()> {
    let event = LifecycleEvent::from(args.kind);
    let mut runtime = OperatorRuntime::new(config).await?;

    match runtime.handle(event).await? {
        Dispatched::Pass(outcome) => {
            output(
                &pass_output(event, outcome, runtime.controller().status()),
                json_mode,
            );
            Ok(())
        }
        Dispatched::Action(_) => bail!("{event} is not a reconciliation event"),
    }
}
