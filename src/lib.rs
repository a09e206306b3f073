//! smokeping-operator - lifecycle operator for a containerized Smokeping
//!
//! Reacts to lifecycle events by rendering Smokeping's configuration from a
//! declared config, pushing it into the workload and restarting the
//! supervised `smokeping` process, while publishing a single reconciliation
//! status.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, error taxonomy and port traits
//! - **Service Layer** (`services`): target resolution, desired-state
//!   building, runtime synchronization and the reconciliation controller
//! - **Adapters** (`adapters`): renderer, workload and status implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use smokeping_operator::adapters::{renderer::TemplateRenderer, status::FileStatusReporter, workload::LocalWorkload};
//! use smokeping_operator::domain::models::{DeclaredConfig, LifecycleEvent, WorkloadSettings};
//! use smokeping_operator::services::ReconciliationController;
//!
//! # async fn run() {
//! let settings = WorkloadSettings::default();
//! let mut controller = ReconciliationController::new(
//!     Arc::new(TemplateRenderer::default()),
//!     Arc::new(LocalWorkload::from_settings(&settings)),
//!     Arc::new(FileStatusReporter::new("status.json")),
//!     settings,
//! );
//! controller.dispatch(LifecycleEvent::RuntimeReady, &DeclaredConfig::default()).await;
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{
    ActionError, MalformedInputError, PassError, RenderError, RuntimeApplyError, WorkloadError,
};
pub use domain::models::{
    ActionResult, DeclaredConfig, Destination, Dispatched, LifecycleEvent, OperatorConfig,
    PassOutcome, ProcessDescriptor, ReconciliationStatus, UnitStatus, WorkloadSettings,
};
pub use domain::ports::{Renderer, StatusReporter, Workload};
pub use infrastructure::config::{ConfigError, ConfigLoader, DeclaredConfigLoader};
pub use services::{ReconciliationController, RuntimeSynchronizer};
