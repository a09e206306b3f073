//! Reconciliation controller.
//!
//! Receives lifecycle events and drives the resolver, builder, renderer and
//! synchronizer in order. Each status transition is computed as a value and
//! published exactly once by [`ReconciliationController::dispatch`].

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{ActionError, PassError};
use crate::domain::models::{
    ActionResult, DeclaredConfig, Dispatched, FileLayout, LifecycleEvent, PassOutcome,
    RenderContext, RenderedFile, UnitStatus, WorkloadSettings,
};
use crate::domain::ports::{Renderer, StatusReporter, Workload};
use crate::services::descriptor_builder::build_process_descriptor;
use crate::services::runtime_sync::RuntimeSynchronizer;
use crate::services::target_resolver;

/// Status message shown while a pass is running.
pub const MAINTENANCE_MESSAGE: &str = "Configuring Smokeping";

/// Name of the operator action handled on [`LifecycleEvent::RestartRequested`].
pub const RESTART_ACTION: &str = "restart";

const RESTART_LOG: &str = "Restarting Smokeping services";

/// Sole writer of the workload's configuration and process state.
pub struct ReconciliationController {
    renderer: Arc<dyn Renderer>,
    workload: Arc<dyn Workload>,
    reporter: Arc<dyn StatusReporter>,
    settings: WorkloadSettings,
    layout: FileLayout,
    status: UnitStatus,
}

impl ReconciliationController {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        workload: Arc<dyn Workload>,
        reporter: Arc<dyn StatusReporter>,
        settings: WorkloadSettings,
    ) -> Self {
        let layout = FileLayout::smokeping(&settings);
        Self {
            renderer,
            workload,
            reporter,
            settings,
            layout,
            status: UnitStatus::idle(),
        }
    }

    /// Resume from a previously published status.
    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }

    /// Current status value.
    pub fn status(&self) -> &UnitStatus {
        &self.status
    }

    /// Handle one lifecycle event.
    ///
    /// Never returns an error: pass failures end in a Blocked status and
    /// action failures are carried in the returned [`Dispatched::Action`].
    #[instrument(skip_all, fields(pass_id = %Uuid::new_v4(), event = %event))]
    pub async fn dispatch(&mut self, event: LifecycleEvent, declared: &DeclaredConfig) -> Dispatched {
        match event {
            LifecycleEvent::RuntimeReady | LifecycleEvent::ConfigurationChanged => {
                Dispatched::Pass(self.run_pass(declared).await)
            }
            LifecycleEvent::RestartRequested => Dispatched::Action(self.restart().await),
        }
    }

    async fn run_pass(&mut self, declared: &DeclaredConfig) -> PassOutcome {
        if !self.workload.can_connect().await {
            info!(
                container = %self.workload.name(),
                "workload not reachable, deferring pass"
            );
            return PassOutcome::Deferred;
        }

        self.transition(UnitStatus::maintenance(MAINTENANCE_MESSAGE)).await;
        let terminal = self.full_pass(declared).await;
        self.transition(terminal).await;
        PassOutcome::Completed
    }

    /// Run every step of a pass and return the terminal status it earned.
    async fn full_pass(&self, declared: &DeclaredConfig) -> UnitStatus {
        match self.reconcile(declared).await {
            Ok(()) => {
                info!("pass completed");
                UnitStatus::active()
            }
            Err(PassError::RuntimeApply(err)) => {
                warn!(
                    step = %err.step(),
                    unavailable = err.is_unavailable(),
                    error = %err,
                    "pass blocked"
                );
                UnitStatus::blocked(err.to_string())
            }
            Err(err) => {
                warn!(error = %err, "pass blocked");
                UnitStatus::blocked(err.to_string())
            }
        }
    }

    async fn reconcile(&self, declared: &DeclaredConfig) -> Result<(), PassError> {
        let destinations = target_resolver::resolve(&declared.targets)?;
        info!(destinations = destinations.len(), "targets resolved");

        let context = RenderContext::new(declared.clone(), destinations);
        let descriptor = build_process_descriptor(declared, &self.settings);
        let files = self.render_all(&context).await?;

        RuntimeSynchronizer::new(self.workload.as_ref())
            .apply(&self.layout.directories, &files, &descriptor)
            .await?;
        Ok(())
    }

    /// Render the whole layout before anything is written.
    async fn render_all(&self, context: &RenderContext) -> Result<Vec<RenderedFile>, PassError> {
        let mut files = Vec::with_capacity(self.layout.files.len());
        for spec in &self.layout.files {
            let ctx = spec.with_context.then_some(context);
            let content = self
                .renderer
                .render(&spec.template, ctx)
                .await
                .map_err(|source| PassError::Render {
                    template: spec.template.clone(),
                    source,
                })?;
            files.push(RenderedFile {
                path: spec.path.clone(),
                content,
                mode: spec.mode,
            });
        }
        Ok(files)
    }

    /// Restart the supervised process without touching configuration or
    /// ambient status.
    async fn restart(&self) -> Result<ActionResult, ActionError> {
        let mut result = ActionResult::new(RESTART_ACTION);
        result.log(RESTART_LOG);
        info!(service = %self.settings.service, "{RESTART_LOG}");

        if !self.workload.can_connect().await {
            error!("Container {} not found", self.workload.name());
            return Ok(result);
        }

        RuntimeSynchronizer::new(self.workload.as_ref())
            .restart(&self.settings.service)
            .await
            .map_err(|err| {
                warn!(step = %err.step(), error = %err, "restart action failed");
                ActionError::new(RESTART_ACTION, err.to_string())
            })?;
        Ok(result)
    }

    async fn transition(&mut self, status: UnitStatus) {
        info!(status = %status.status, message = ?status.message, "status changed");
        if let Err(err) = self.reporter.publish(&status).await {
            warn!(error = %err, "failed to publish status");
        }
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::renderer::FixedRenderer;
    use crate::adapters::status::MemoryStatusReporter;
    use crate::adapters::workload::{MemoryWorkload, WorkloadCall};
    use crate::domain::errors::WorkloadError;
    use crate::domain::models::ReconciliationStatus;

    struct Harness {
        controller: ReconciliationController,
        renderer: FixedRenderer,
        workload: MemoryWorkload,
        reporter: MemoryStatusReporter,
    }

    fn harness_with(workload: MemoryWorkload) -> Harness {
        let renderer = FixedRenderer::new();
        let reporter = MemoryStatusReporter::new();
        let controller = ReconciliationController::new(
            Arc::new(renderer.clone()),
            Arc::new(workload.clone()),
            Arc::new(reporter.clone()),
            WorkloadSettings::default(),
        );
        Harness {
            controller,
            renderer,
            workload,
            reporter,
        }
    }

    fn harness() -> Harness {
        harness_with(MemoryWorkload::new("smokeping"))
    }

    fn declared(targets: &str) -> DeclaredConfig {
        DeclaredConfig::new("UTC", targets)
    }

    fn control_calls(calls: &[WorkloadCall]) -> Vec<WorkloadCall> {
        calls
            .iter()
            .filter(|c| matches!(c, WorkloadCall::Start(_) | WorkloadCall::Stop(_)))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_single_destination_goes_active() {
        let mut h = harness();
        let cfg = declared(r#"[{"unit_name":"a","host":"10.0.0.1"}]"#);

        let outcome = h.controller.dispatch(LifecycleEvent::RuntimeReady, &cfg).await;

        assert_eq!(outcome, Dispatched::Pass(PassOutcome::Completed));
        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert_eq!(
            h.reporter.states().await,
            vec![ReconciliationStatus::Maintenance, ReconciliationStatus::Active]
        );
        assert_eq!(
            h.reporter.history().await[0].message.as_deref(),
            Some(MAINTENANCE_MESSAGE)
        );

        let last = h.reporter.last().await.unwrap();
        assert_eq!(last.status, ReconciliationStatus::Active);
        assert!(last.message.is_none());

        let targets = h.workload.file("/config/Targets").await.unwrap();
        assert_eq!(targets, b"Targets\na 10.0.0.1\n");
        assert_eq!(h.workload.file_mode("/config/Targets").await, Some(0o644));
        assert!(h.workload.has_dir("/var/cache/smokeping").await);
        assert!(h.workload.has_dir("/config").await);
        let service = h.workload.service("smokeping").await.unwrap();
        assert_eq!(service.environment["TZ"], "UTC");
        assert!(h.workload.is_running("smokeping").await);
    }

    #[tokio::test]
    async fn test_malformed_targets_blocks_without_side_effects() {
        let mut h = harness();

        h.controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &declared("{not json"))
            .await;

        let status = h.controller.status();
        assert_eq!(status.status, ReconciliationStatus::Blocked);
        let message = status.message.as_deref().unwrap();
        assert!(message.starts_with("Malformed JSON config for targets: "));
        assert!(message.len() > "Malformed JSON config for targets: ".len());
        assert!(h.workload.calls().await.is_empty());
        assert!(h.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_empty_targets_goes_active() {
        let mut h = harness();

        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;

        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert_eq!(
            h.workload.file("/config/Targets").await.unwrap(),
            b"Targets\n"
        );
    }

    #[tokio::test]
    async fn test_unreachable_workload_defers_pass() {
        let mut h = harness_with(MemoryWorkload::unreachable("smokeping"));

        let outcome = h
            .controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;

        assert_eq!(outcome, Dispatched::Pass(PassOutcome::Deferred));
        assert_eq!(h.controller.status().status, ReconciliationStatus::Idle);
        assert!(h.reporter.history().await.is_empty());
        assert!(h.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_restart_stops_once_then_starts_once() {
        let mut h = harness();
        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;
        h.workload.clear_calls().await;
        let before = h.reporter.history().await.len();

        let outcome = h
            .controller
            .dispatch(LifecycleEvent::RestartRequested, &declared("[]"))
            .await;

        let Dispatched::Action(Ok(result)) = outcome else {
            panic!("restart should succeed, got {outcome:?}");
        };
        assert_eq!(result.logs, vec![RESTART_LOG.to_string()]);
        assert_eq!(
            h.workload.calls().await,
            vec![
                WorkloadCall::Stop("smokeping".to_string()),
                WorkloadCall::Start("smokeping".to_string()),
            ]
        );
        assert_eq!(h.reporter.history().await.len(), before);
        assert_eq!(h.renderer.rendered().len(), 8);
    }

    #[tokio::test]
    async fn test_render_failure_writes_nothing() {
        let mut h = harness();
        h.renderer.fail_template("Database");

        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;

        let status = h.controller.status();
        assert_eq!(status.status, ReconciliationStatus::Blocked);
        assert!(status.message.as_deref().unwrap().contains("Database"));
        assert!(h.workload.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_two_passes_are_idempotent() {
        let mut h = harness();
        let cfg = declared(r#"[{"unit_name":"a","host":"h1"},{"unit_name":"b","host":"h2"}]"#);

        h.controller.dispatch(LifecycleEvent::RuntimeReady, &cfg).await;
        let first_status = h.controller.status().status;
        let first_files = h.workload.files().await;

        h.controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &cfg)
            .await;

        assert_eq!(h.controller.status().status, first_status);
        assert_eq!(h.workload.files().await, first_files);
        assert!(h.workload.is_running("smokeping").await);
    }

    #[tokio::test]
    async fn test_failed_restart_leaves_status_alone() {
        let mut h = harness();
        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;
        h.workload
            .fail_on_start(WorkloadError::Supervisor("exec format error".to_string()))
            .await;
        let before = h.controller.status().clone();

        let outcome = h
            .controller
            .dispatch(LifecycleEvent::RestartRequested, &declared("[]"))
            .await;

        let Dispatched::Action(Err(err)) = outcome else {
            panic!("restart should fail, got {outcome:?}");
        };
        assert_eq!(err.action, RESTART_ACTION);
        assert!(err.message.contains("exec format error"));
        assert_eq!(h.controller.status(), &before);
    }

    #[tokio::test]
    async fn test_restart_with_unreachable_workload_is_noop() {
        let mut h = harness_with(MemoryWorkload::unreachable("smokeping"));

        let outcome = h
            .controller
            .dispatch(LifecycleEvent::RestartRequested, &declared("[]"))
            .await;

        assert!(matches!(outcome, Dispatched::Action(Ok(_))));
        assert!(h.workload.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_start_failure_blocks_with_step_detail() {
        let mut h = harness();
        h.workload
            .fail_on_start(WorkloadError::Supervisor("exec format error".to_string()))
            .await;

        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;

        let status = h.controller.status();
        assert_eq!(status.status, ReconciliationStatus::Blocked);
        assert!(status
            .message
            .as_deref()
            .unwrap()
            .starts_with("Failed to start service smokeping"));
        assert_eq!(
            control_calls(&h.workload.calls().await),
            vec![WorkloadCall::Start("smokeping".to_string())]
        );
    }

    #[tokio::test]
    async fn test_blocked_is_not_sticky() {
        let mut h = harness();
        h.controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &declared("{not json"))
            .await;
        assert_eq!(h.controller.status().status, ReconciliationStatus::Blocked);

        h.controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &declared("[]"))
            .await;
        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert!(h.controller.status().message.is_none());
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_abort_pass() {
        let mut h = harness();
        h.reporter.set_failing(true).await;

        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;

        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert!(h.workload.is_running("smokeping").await);
    }

    #[tokio::test]
    async fn test_only_context_templates_receive_destinations() {
        let mut h = harness();
        h.controller
            .dispatch(
                LifecycleEvent::RuntimeReady,
                &declared(r#"[{"unit_name":"a","host":"h"}]"#),
            )
            .await;

        assert_eq!(h.workload.file("/config/Probes").await.unwrap(), b"Probes\n");
        assert_eq!(
            h.workload.file("/config/Database").await.unwrap(),
            b"Database\na h\n"
        );
    }

    async fn blocked_message(h: &mut Harness) -> String {
        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;
        let status = h.controller.status();
        assert_eq!(status.status, ReconciliationStatus::Blocked);
        let last = h.reporter.last().await.unwrap();
        assert_eq!(&last, status);
        status.message.clone().unwrap()
    }

    #[tokio::test]
    async fn test_directory_failure_blocks_before_any_write() {
        let mut h = harness();
        h.workload
            .fail_on_make_dir(WorkloadError::Io("permission denied".to_string()))
            .await;

        let message = blocked_message(&mut h).await;

        assert!(message.starts_with("Failed to create directory /var/cache/smokeping"));
        assert!(message.contains("permission denied"));
        assert_eq!(
            h.workload.calls().await,
            vec![WorkloadCall::MakeDir("/var/cache/smokeping".to_string())]
        );
        assert!(h.workload.files().await.is_empty());
    }

    #[tokio::test]
    async fn test_layer_failure_blocks_without_start() {
        let mut h = harness();
        h.workload
            .fail_on_add_layer(WorkloadError::Supervisor("plan locked".to_string()))
            .await;

        let message = blocked_message(&mut h).await;

        assert!(message.starts_with("Failed to apply layer for service smokeping"));
        assert!(message.contains("plan locked"));
        assert_eq!(h.workload.files().await.len(), 8);
        assert!(control_calls(&h.workload.calls().await).is_empty());
        assert!(!h.workload.is_running("smokeping").await);
    }

    #[tokio::test]
    async fn test_stop_failure_blocks_without_start() {
        let mut h = harness();
        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;
        h.workload.clear_calls().await;
        h.workload
            .fail_on_stop(WorkloadError::Supervisor("timed out".to_string()))
            .await;

        let message = blocked_message(&mut h).await;

        assert!(message.starts_with("Failed to stop service smokeping"));
        assert_eq!(
            control_calls(&h.workload.calls().await),
            vec![WorkloadCall::Stop("smokeping".to_string())]
        );
        assert!(h.workload.is_running("smokeping").await);
    }

    #[tokio::test]
    async fn test_workload_lost_mid_pass_blocks_with_step_detail() {
        let mut h = harness();
        h.workload
            .fail_on_push(WorkloadError::Unavailable("smokeping".to_string()))
            .await;

        let message = blocked_message(&mut h).await;

        assert!(message.starts_with("Failed to write /config/"));
        assert!(message.ends_with("Container smokeping not found"));
        assert!(control_calls(&h.workload.calls().await).is_empty());
    }

    #[tokio::test]
    async fn test_pass_resumes_once_workload_is_reachable_again() {
        let mut h = harness();
        h.controller
            .dispatch(LifecycleEvent::RuntimeReady, &declared("[]"))
            .await;
        let published = h.reporter.history().await.len();

        h.workload.set_reachable(false).await;
        let outcome = h
            .controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &declared("[]"))
            .await;
        assert_eq!(outcome, Dispatched::Pass(PassOutcome::Deferred));
        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert_eq!(h.reporter.history().await.len(), published);

        h.workload.set_reachable(true).await;
        h.workload
            .fail_on_start(WorkloadError::Supervisor("exec format error".to_string()))
            .await;
        blocked_message(&mut h).await;

        h.workload.clear_failures().await;
        let outcome = h
            .controller
            .dispatch(LifecycleEvent::ConfigurationChanged, &declared("[]"))
            .await;
        assert_eq!(outcome, Dispatched::Pass(PassOutcome::Completed));
        assert_eq!(h.controller.status().status, ReconciliationStatus::Active);
        assert!(h.workload.is_running("smokeping").await);
    }
}
