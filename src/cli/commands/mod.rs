//! CLI command implementations

pub mod action;
pub mod event;
pub mod serve;
pub mod status;
