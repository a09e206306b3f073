//! Operator actions.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::cli::runtime::OperatorRuntime;
use crate::cli::types::ActionCommands;
use crate::domain::errors::ActionError;
use crate::domain::models::{ActionResult, Dispatched, LifecycleEvent, OperatorConfig};

#[derive(Debug, Serialize)]
pub struct ActionOutput {
    pub action: String,
    pub success: bool,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Result<ActionResult, ActionError>> for ActionOutput {
    fn from(result: &Result<ActionResult, ActionError>) -> Self {
        match result {
            Ok(result) => Self {
                action: result.action.clone(),
                success: true,
                logs: result.logs.clone(),
                error: None,
            },
            Err(err) => Self {
                action: err.action.clone(),
                success: false,
                logs: Vec::new(),
                error: Some(err.message.clone()),
            },
        }
    }
}

impl CommandOutput for ActionOutput {
    fn to_human(&self) -> String {
        let mut lines = self.logs.clone();
        match &self.error {
            Some(error) => lines.push(format!("Action {} failed: {error}", self.action)),
            None => lines.push(format!("Action {} completed", self.action)),
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(action: ActionCommands, config: OperatorConfig, json_mode: bool) -> Result<()> {
    let event = match action {
        ActionCommands::Restart => LifecycleEvent::RestartRequested,
    };
    let mut runtime = OperatorRuntime::new(config).await?;

    match runtime.handle(event).await? {
        Dispatched::Action(result) => {
            output(&ActionOutput::from(&result), json_mode);
            result.map(|_| ()).map_err(anyhow::Error::from)
        }
        Dispatched::Pass(_) => bail!("{event} is not an action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_action_output() {
        let out = ActionOutput::from(&Err(ActionError::new("restart", "exec format error")));
        assert!(!out.success);
        assert_eq!(out.to_human(), "Action restart failed: exec format error");
        assert_eq!(out.to_json()["error"], "exec format error");
    }

    #[test]
    fn test_successful_action_output() {
        let mut result = ActionResult::new("restart");
        result.log("Restarting Smokeping services");
        let out = ActionOutput::from(&Ok(result));
        assert!(out.success);
        assert!(out.to_json().get("error").is_none());
        assert_eq!(
            out.to_human(),
            "Restarting Smokeping services\nAction restart completed"
        );
    }
}
