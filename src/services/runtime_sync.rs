//! Runtime synchronization.
//!
//! Pushes rendered configuration into the workload and drives the supervised
//! process to its desired run state. Steps run in a fixed order and the first
//! failure aborts the rest; retries are left to event redelivery.

use tracing::{debug, info, instrument};

use crate::domain::errors::RuntimeApplyError;
use crate::domain::models::{DirectorySpec, Layer, ProcessDescriptor, RenderedFile};
use crate::domain::ports::Workload;

/// Applies desired state to one workload.
pub struct RuntimeSynchronizer<'a> {
    workload: &'a dyn Workload,
}

impl<'a> RuntimeSynchronizer<'a> {
    pub fn new(workload: &'a dyn Workload) -> Self {
        Self { workload }
    }

    /// Ensure directories, write files, apply the descriptor, then restart
    /// the process.
    #[instrument(skip_all, fields(workload = %self.workload.name(), service = %descriptor.name))]
    pub async fn apply(
        &self,
        directories: &[DirectorySpec],
        files: &[RenderedFile],
        descriptor: &ProcessDescriptor,
    ) -> Result<(), RuntimeApplyError> {
        for dir in directories {
            self.workload
                .make_dir(&dir.path, dir.owner.as_ref())
                .await
                .map_err(|source| RuntimeApplyError::Directory {
                    path: dir.path.clone(),
                    source,
                })?;
        }

        for file in files {
            debug!(path = %file.path, bytes = file.content.len(), "pushing file");
            self.workload
                .push(&file.path, &file.content, file.mode)
                .await
                .map_err(|source| RuntimeApplyError::Write {
                    path: file.path.clone(),
                    source,
                })?;
        }

        let layer = Layer::for_descriptor(descriptor.clone());
        self.workload
            .add_layer(&descriptor.name, &layer, true)
            .await
            .map_err(|source| RuntimeApplyError::Layer {
                service: descriptor.name.clone(),
                source,
            })?;

        self.restart(&descriptor.name).await
    }

    /// Stop the service if it is running, then start it.
    ///
    /// A service the supervisor does not know yet is only started.
    pub async fn restart(&self, service: &str) -> Result<(), RuntimeApplyError> {
        let info = self
            .workload
            .get_service(service)
            .await
            .map_err(|source| RuntimeApplyError::Query {
                service: service.to_string(),
                source,
            })?;

        match info {
            Some(info) if info.is_running() => {
                info!(service, "stopping running service");
                self.workload
                    .stop(service)
                    .await
                    .map_err(|source| RuntimeApplyError::Stop {
                        service: service.to_string(),
                        source,
                    })?;
            }
            Some(_) => debug!(service, "service not running, nothing to stop"),
            None => debug!(service, "service not known to supervisor yet"),
        }

        self.workload
            .start(service)
            .await
            .map_err(|source| RuntimeApplyError::Start {
                service: service.to_string(),
                source,
            })?;
        info!(service, "service started");
        Ok(())
    }
}
