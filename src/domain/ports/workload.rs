//! Workload port - the container filesystem and its process supervisor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Layer, Ownership, Startup};

/// Run state reported by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Active,
    Inactive,
}

/// A service known to the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub startup: Startup,
    pub current: ServiceState,
}

impl ServiceInfo {
    pub fn is_running(&self) -> bool {
        self.current == ServiceState::Active
    }
}

/// Handle on one workload container.
///
/// Every method reports [`WorkloadError::Unavailable`] when the container
/// cannot be reached.
///
/// [`WorkloadError::Unavailable`]: crate::domain::errors::WorkloadError::Unavailable
#[async_trait]
pub trait Workload: Send + Sync {
    /// Container name.
    fn name(&self) -> &str;

    /// Check whether the container's runtime can be reached.
    async fn can_connect(&self) -> bool;

    /// Create a directory and its parents. An existing directory is not an error.
    async fn make_dir(&self, path: &str, owner: Option<&Ownership>) -> DomainResult<()>;

    /// Write `content` to `path`, replacing any previous file.
    async fn push(&self, path: &str, content: &[u8], mode: u32) -> DomainResult<()>;

    /// Add a layer to the supervisor plan under `label`.
    ///
    /// With `combine`, a layer already holding `label` is combined
    /// service by service according to each service's override policy.
    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> DomainResult<()>;

    /// Look up a service. `None` when no layer defines it.
    async fn get_service(&self, name: &str) -> DomainResult<Option<ServiceInfo>>;

    async fn start(&self, name: &str) -> DomainResult<()>;

    async fn stop(&self, name: &str) -> DomainResult<()>;
}
