use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reconciliation state surfaced to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    /// No pass has run yet
    Idle,
    /// A pass is in progress
    Maintenance,
    /// The last pass settled the workload
    Active,
    /// The last pass needs operator intervention
    Blocked,
}

impl ReconciliationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Maintenance => "maintenance",
            Self::Active => "active",
            Self::Blocked => "blocked",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Blocked)
    }
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current status value plus its optional human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub status: ReconciliationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl UnitStatus {
    pub fn idle() -> Self {
        Self::new(ReconciliationStatus::Idle, None)
    }

    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::new(ReconciliationStatus::Maintenance, Some(message.into()))
    }

    pub fn active() -> Self {
        Self::new(ReconciliationStatus::Active, None)
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(ReconciliationStatus::Blocked, Some(message.into()))
    }

    fn new(status: ReconciliationStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            updated_at: Utc::now(),
        }
    }
}

impl Default for UnitStatus {
    fn default() -> Self {
        Self::idle()
    }
}
