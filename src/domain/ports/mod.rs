//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the reconciliation engine consumes:
//! - Renderer: turns a template name and context into file bytes
//! - Workload: the container filesystem and its process supervisor
//! - StatusReporter: publishes the current status to the platform
//!
//! The engine depends only on these traits, so every component can be
//! exercised without a live container.

pub mod renderer;
pub mod status_reporter;
pub mod workload;

pub use renderer::Renderer;
pub use status_reporter::StatusReporter;
pub use workload::{ServiceInfo, ServiceState, Workload};
