//! Last published status plus the service's current run state.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::status::FileStatusReporter;
use crate::adapters::workload::LocalWorkload;
use crate::cli::output::{colorize_status, output, CommandOutput};
use crate::domain::models::{OperatorConfig, UnitStatus};
use crate::domain::ports::Workload;

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    #[serde(flatten)]
    pub status: UnitStatus,
    pub workload_reachable: bool,
    /// `None` when the service is not defined yet or the workload is unreachable
    pub service_running: Option<bool>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!("Status:    {}", colorize_status(self.status.status))];
        if let Some(message) = &self.status.message {
            lines.push(format!("Message:   {message}"));
        }
        lines.push(format!("Updated:   {}", self.status.updated_at.to_rfc3339()));
        lines.push(format!(
            "Workload:  {}",
            if self.workload_reachable { "reachable" } else { "unreachable" }
        ));
        let service = match self.service_running {
            Some(true) => "running",
            Some(false) => "stopped",
            None => "not defined",
        };
        lines.push(format!("Service:   {service}"));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: OperatorConfig, json_mode: bool) -> Result<()> {
    let status = FileStatusReporter::new(config.status.path.clone())
        .read()
        .await
        .context("Failed to read status file")?
        .unwrap_or_default();

    let workload = LocalWorkload::from_settings(&config.workload);
    let workload_reachable = workload.can_connect().await;
    let service_running = if workload_reachable {
        workload
            .get_service(&config.workload.service)
            .await
            .context("Failed to query the supervisor")?
            .map(|info| info.is_running())
    } else {
        None
    };

    output(
        &StatusOutput {
            status,
            workload_reachable,
            service_running,
        },
        json_mode,
    );
    Ok(())
}
