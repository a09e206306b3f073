//! Reconciliation engine services.
//!
//! Pure building blocks (`target_resolver`, `descriptor_builder`) plus the
//! two stateful drivers (`runtime_sync`, `controller`).

pub mod controller;
pub mod descriptor_builder;
pub mod runtime_sync;
pub mod target_resolver;

pub use controller::{ReconciliationController, MAINTENANCE_MESSAGE, RESTART_ACTION};
pub use descriptor_builder::build_process_descriptor;
pub use runtime_sync::RuntimeSynchronizer;
