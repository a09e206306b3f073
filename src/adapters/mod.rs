//! Adapters for the engine's external collaborators.

pub mod renderer;
pub mod status;
pub mod workload;
