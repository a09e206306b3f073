use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Operator-supplied intent for one reconciliation pass.
///
/// Loaded once at the start of a pass and never mutated while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeclaredConfig {
    /// IANA timezone identifier handed to the workload as `TZ`
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// JSON list of `{"unit_name": .., "host": ..}` records
    #[serde(default = "default_targets")]
    pub targets: String,

    /// Extra runtime tuning options exported as environment variables
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_targets() -> String {
    "[]".to_string()
}

impl Default for DeclaredConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            targets: default_targets(),
            environment: BTreeMap::new(),
        }
    }
}

impl DeclaredConfig {
    pub fn new(timezone: impl Into<String>, targets: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            targets: targets.into(),
            environment: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}
