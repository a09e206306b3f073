//! Status file reporter.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::errors::StatusError;
use crate::domain::models::UnitStatus;
use crate::domain::ports::StatusReporter;

/// Writes the current status as JSON, replacing the file atomically.
#[derive(Debug, Clone)]
pub struct FileStatusReporter {
    path: PathBuf,
}

impl FileStatusReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read back the last published status, if any.
    pub async fn read(&self) -> Result<Option<UnitStatus>, StatusError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl StatusReporter for FileStatusReporter {
    async fn publish(&self, status: &UnitStatus) -> Result<(), StatusError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(status)?).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(status = %status.status, path = %self.path.display(), "status published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ReconciliationStatus;

    #[tokio::test]
    async fn test_publish_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = FileStatusReporter::new(dir.path().join("state/status.json"));
        assert!(reporter.read().await.unwrap().is_none());

        reporter.publish(&UnitStatus::blocked("bad targets")).await.unwrap();
        let status = reporter.read().await.unwrap().unwrap();
        assert_eq!(status.status, ReconciliationStatus::Blocked);
        assert_eq!(status.message.as_deref(), Some("bad targets"));

        reporter.publish(&UnitStatus::active()).await.unwrap();
        let status = reporter.read().await.unwrap().unwrap();
        assert_eq!(status.status, ReconciliationStatus::Active);
        assert!(status.message.is_none());
    }
}
