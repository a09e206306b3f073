use async_trait::async_trait;

use crate::domain::errors::StatusError;
use crate::domain::models::UnitStatus;

/// Publishes the controller's status to the platform's status reporting.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    async fn publish(&self, status: &UnitStatus) -> Result<(), StatusError>;
}
