//! Infrastructure layer module
//!
//! Configuration loading and logging setup used by the CLI edge.

pub mod config;
pub mod logging;
