//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Operator settings from YAML files and `SMOKEPING_OPERATOR_*` variables
//! - Declared configuration reloaded at the start of every pass
//! - Validation of operator settings

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, DeclaredConfigLoader, CONFIG_DIR};
