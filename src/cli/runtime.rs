//! Wiring of the concrete adapters behind the controller.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::adapters::renderer::TemplateRenderer;
use crate::adapters::status::FileStatusReporter;
use crate::adapters::workload::LocalWorkload;
use crate::domain::models::{DeclaredConfig, Dispatched, LifecycleEvent, OperatorConfig};
use crate::infrastructure::config::DeclaredConfigLoader;
use crate::services::ReconciliationController;

/// Controller bound to the local workload, template set and status file.
pub struct OperatorRuntime {
    config: OperatorConfig,
    controller: ReconciliationController,
}

impl OperatorRuntime {
    /// Build the adapters and resume from the last published status.
    pub async fn new(config: OperatorConfig) -> Result<Self> {
        let renderer = Arc::new(TemplateRenderer::new(config.workload.template_dir.clone()));
        let workload = Arc::new(LocalWorkload::from_settings(&config.workload));
        let reporter = FileStatusReporter::new(config.status.path.clone());
        let previous = reporter
            .read()
            .await
            .context("Failed to read the previous status")?
            .unwrap_or_default();

        let controller = ReconciliationController::new(
            renderer,
            workload,
            Arc::new(reporter),
            config.workload.clone(),
        )
        .with_status(previous);

        Ok(Self { config, controller })
    }

    pub fn controller(&self) -> &ReconciliationController {
        &self.controller
    }

    /// Load the declared configuration and hand `event` to the controller.
    ///
    /// The restart action does not read declared configuration, so it still
    /// runs when the declared file is broken.
    pub async fn handle(&mut self, event: LifecycleEvent) -> Result<Dispatched> {
        let declared = match DeclaredConfigLoader::load(&self.config.declared_path) {
            Ok(declared) => declared,
            Err(err) if event == LifecycleEvent::RestartRequested => {
                warn!(error = %format!("{err:#}"), "ignoring unreadable declared configuration");
                DeclaredConfig::default()
            }
            Err(err) => return Err(err),
        };
        Ok(self.controller.dispatch(event, &declared).await)
    }
}
