//! In-memory workload for tests and dry runs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::domain::errors::{DomainResult, WorkloadError};
use crate::domain::models::{Layer, Ownership, ProcessDescriptor};
use crate::domain::ports::{ServiceInfo, ServiceState, Workload};

/// A call made against the workload, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadCall {
    MakeDir(String),
    Push(String),
    AddLayer(String),
    Start(String),
    Stop(String),
}

#[derive(Debug, Default)]
struct Failures {
    make_dir: Option<WorkloadError>,
    push: Option<WorkloadError>,
    add_layer: Option<WorkloadError>,
    start: Option<WorkloadError>,
    stop: Option<WorkloadError>,
}

#[derive(Debug)]
struct State {
    reachable: bool,
    directories: BTreeSet<String>,
    files: BTreeMap<String, (Vec<u8>, u32)>,
    layers: BTreeMap<String, Layer>,
    running: BTreeSet<String>,
    calls: Vec<WorkloadCall>,
    failures: Failures,
}

impl State {
    fn service(&self, name: &str) -> Option<ProcessDescriptor> {
        self.layers
            .values()
            .filter_map(|layer| layer.services.get(name))
            .cloned()
            .reduce(ProcessDescriptor::combine)
    }
}

/// Workload that keeps files, layers and run state in memory and records
/// every mutating call.
#[derive(Clone)]
pub struct MemoryWorkload {
    name: String,
    state: Arc<RwLock<State>>,
}

impl MemoryWorkload {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_reachability(name, true)
    }

    /// A workload whose container cannot be reached yet.
    pub fn unreachable(name: impl Into<String>) -> Self {
        Self::with_reachability(name, false)
    }

    fn with_reachability(name: impl Into<String>, reachable: bool) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(State {
                reachable,
                directories: BTreeSet::new(),
                files: BTreeMap::new(),
                layers: BTreeMap::new(),
                running: BTreeSet::new(),
                calls: Vec::new(),
                failures: Failures::default(),
            })),
        }
    }

    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.reachable = reachable;
    }

    pub async fn fail_on_make_dir(&self, err: WorkloadError) {
        self.state.write().await.failures.make_dir = Some(err);
    }

    pub async fn fail_on_push(&self, err: WorkloadError) {
        self.state.write().await.failures.push = Some(err);
    }

    pub async fn fail_on_add_layer(&self, err: WorkloadError) {
        self.state.write().await.failures.add_layer = Some(err);
    }

    pub async fn fail_on_start(&self, err: WorkloadError) {
        self.state.write().await.failures.start = Some(err);
    }

    pub async fn fail_on_stop(&self, err: WorkloadError) {
        self.state.write().await.failures.stop = Some(err);
    }

    pub async fn clear_failures(&self) {
        self.state.write().await.failures = Failures::default();
    }

    pub async fn calls(&self) -> Vec<WorkloadCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn clear_calls(&self) {
        self.state.write().await.calls.clear();
    }

    /// Contents of a pushed file.
    pub async fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state
            .read()
            .await
            .files
            .get(path)
            .map(|(content, _)| content.clone())
    }

    pub async fn file_mode(&self, path: &str) -> Option<u32> {
        self.state.read().await.files.get(path).map(|(_, mode)| *mode)
    }

    /// All pushed files keyed by path.
    pub async fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.state
            .read()
            .await
            .files
            .iter()
            .map(|(path, (content, _))| (path.clone(), content.clone()))
            .collect()
    }

    pub async fn has_dir(&self, path: &str) -> bool {
        self.state.read().await.directories.contains(path)
    }

    pub async fn is_running(&self, name: &str) -> bool {
        self.state.read().await.running.contains(name)
    }

    /// Effective service definition after combining all layers.
    pub async fn service(&self, name: &str) -> Option<ProcessDescriptor> {
        self.state.read().await.service(name)
    }

    async fn record(&self, call: WorkloadCall) -> DomainResult<RwLockWriteGuard<'_, State>> {
        let mut state = self.state.write().await;
        if !state.reachable {
            return Err(WorkloadError::Unavailable(self.name.clone()));
        }
        state.calls.push(call);
        Ok(state)
    }
}

#[async_trait]
impl Workload for MemoryWorkload {
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_connect(&self) -> bool {
        self.state.read().await.reachable
    }

    async fn make_dir(&self, path: &str, _owner: Option<&Ownership>) -> DomainResult<()> {
        let mut state = self.record(WorkloadCall::MakeDir(path.to_string())).await?;
        if let Some(err) = state.failures.make_dir.clone() {
            return Err(err);
        }
        state.directories.insert(path.to_string());
        Ok(())
    }

    async fn push(&self, path: &str, content: &[u8], mode: u32) -> DomainResult<()> {
        let mut state = self.record(WorkloadCall::Push(path.to_string())).await?;
        if let Some(err) = state.failures.push.clone() {
            return Err(err);
        }
        state
            .files
            .insert(path.to_string(), (content.to_vec(), mode));
        Ok(())
    }

    async fn add_layer(&self, label: &str, layer: &Layer, combine: bool) -> DomainResult<()> {
        let mut state = self.record(WorkloadCall::AddLayer(label.to_string())).await?;
        if let Some(err) = state.failures.add_layer.clone() {
            return Err(err);
        }
        if let Some(existing) = state.layers.get_mut(label) {
            if !combine {
                return Err(WorkloadError::Supervisor(format!(
                    "layer {label} already exists"
                )));
            }
            existing.combine(layer.clone());
        } else {
            state.layers.insert(label.to_string(), layer.clone());
        }
        Ok(())
    }

    async fn get_service(&self, name: &str) -> DomainResult<Option<ServiceInfo>> {
        let state = self.state.read().await;
        if !state.reachable {
            return Err(WorkloadError::Unavailable(self.name.clone()));
        }
        Ok(state.service(name).map(|service| ServiceInfo {
            name: name.to_string(),
            startup: service.startup,
            current: if state.running.contains(name) {
                ServiceState::Active
            } else {
                ServiceState::Inactive
            },
        }))
    }

    async fn start(&self, name: &str) -> DomainResult<()> {
        let mut state = self.record(WorkloadCall::Start(name.to_string())).await?;
        if let Some(err) = state.failures.start.clone() {
            return Err(err);
        }
        if state.service(name).is_none() {
            return Err(WorkloadError::UnknownService(name.to_string()));
        }
        state.running.insert(name.to_string());
        Ok(())
    }

    async fn stop(&self, name: &str) -> DomainResult<()> {
        let mut state = self.record(WorkloadCall::Stop(name.to_string())).await?;
        if let Some(err) = state.failures.stop.clone() {
            return Err(err);
        }
        state.running.remove(name);
        Ok(())
    }
}
