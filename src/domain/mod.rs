//! Domain layer for the Smokeping operator
//!
//! This module contains the reconciliation data model, the error taxonomy
//! and the ports the engine talks through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    ActionError, ApplyStep, DomainResult, MalformedInputError, PassError, RenderError,
    RuntimeApplyError, StatusError, WorkloadError,
};
