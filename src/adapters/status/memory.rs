//! In-memory status reporter for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::StatusError;
use crate::domain::models::{ReconciliationStatus, UnitStatus};
use crate::domain::ports::StatusReporter;

/// Keeps every published status in order.
#[derive(Clone, Default)]
pub struct MemoryStatusReporter {
    history: Arc<RwLock<Vec<UnitStatus>>>,
    fail: Arc<RwLock<bool>>,
}

impl MemoryStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make later publishes fail.
    pub async fn set_failing(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    pub async fn history(&self) -> Vec<UnitStatus> {
        self.history.read().await.clone()
    }

    /// Published status values without messages or timestamps.
    pub async fn states(&self) -> Vec<ReconciliationStatus> {
        self.history.read().await.iter().map(|s| s.status).collect()
    }

    pub async fn last(&self) -> Option<UnitStatus> {
        self.history.read().await.last().cloned()
    }
}

#[async_trait]
impl StatusReporter for MemoryStatusReporter {
    async fn publish(&self, status: &UnitStatus) -> Result<(), StatusError> {
        if *self.fail.read().await {
            return Err(StatusError::Publish("status surface unavailable".to_string()));
        }
        self.history.write().await.push(status.clone());
        Ok(())
    }
}
